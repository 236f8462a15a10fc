use bevy::prelude::*;

use crate::engine::assets::model::CurrentModel;
use crate::engine::assets::share_link::encode_share_link;
use crate::engine::scene::grid::OverlayVisibility;
use crate::engine::systems::hud::StatusLine;
use crate::geometry::units::Unit;

/// Unit used for all on-screen distance readouts.
#[derive(Resource, Default)]
pub struct DisplayUnit(pub Unit);

/// Session keybindings that are not part of the measure tool: unit
/// cycling, overlay toggling, and share-link export.
pub fn viewer_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut display_unit: ResMut<DisplayUnit>,
    mut overlays: ResMut<OverlayVisibility>,
    current_model: Res<CurrentModel>,
    mut status: ResMut<StatusLine>,
) {
    if keyboard.just_pressed(KeyCode::KeyU) {
        display_unit.0 = display_unit.0.next();
        info!("Display unit: {}", display_unit.0.label());
    }

    if keyboard.just_pressed(KeyCode::KeyG) {
        overlays.visible = !overlays.visible;
    }

    if keyboard.just_pressed(KeyCode::KeyL) {
        match current_model.get() {
            Some(model) => {
                let link = encode_share_link(&model.name, model.format, &model.bytes);
                // Stdout so the link can be piped or copied from a terminal.
                println!("{link}");
                info!("Share link for {} ({} bytes)", model.name, link.len());
                status.set(format!("Share link printed to stdout ({} chars)", link.len()));
            }
            None => {
                status.set("No model loaded to share");
            }
        }
    }
}
