use bevy::prelude::*;

use crate::engine::camera::{ViewportCamera, camera_controller};
use crate::engine::core::window_config::create_window_config;
use crate::engine::assets::model::CurrentModel;
use crate::engine::loading::model_loader::{
    LoadModelRequest, handle_dropped_files, handle_load_requests, queue_startup_model,
};
use crate::engine::scene::grid::{OverlayVisibility, draw_overlays};
use crate::engine::scene::lighting::spawn_lighting;
use crate::engine::systems::controls::{DisplayUnit, viewer_controls};
use crate::engine::systems::hud::{StatusLine, spawn_hud, update_hud};
use crate::tools::measure::MeasureToolPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(MeasureToolPlugin)
        .insert_resource(ClearColor(Color::srgb(0.102, 0.102, 0.102)))
        .init_resource::<CurrentModel>()
        .init_resource::<ViewportCamera>()
        .init_resource::<DisplayUnit>()
        .init_resource::<OverlayVisibility>()
        .init_resource::<StatusLine>()
        .add_event::<LoadModelRequest>();

    app.add_systems(Startup, (setup, spawn_hud, queue_startup_model))
        .add_systems(
            Update,
            (
                camera_controller,
                handle_dropped_files,
                handle_load_requests,
                draw_overlays,
                viewer_controls,
                update_hud,
            ),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    DefaultPlugins.set(WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    })
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(5.0, 5.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    spawn_lighting(&mut commands);
}
