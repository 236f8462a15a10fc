use bevy::prelude::*;

use crate::engine::assets::model::CurrentModel;
use crate::engine::systems::controls::DisplayUnit;
use crate::geometry::units::{Unit, to_display};
use crate::tools::measure::MeasureTool;

/// One-line status message shown in the top-left corner. Load results and
/// share-link exports write here so the user gets feedback without
/// watching the log.
#[derive(Resource)]
pub struct StatusLine {
    message: String,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: "Drop a .glb or .gltf file to view it".to_string(),
        }
    }
}

impl StatusLine {
    pub fn set(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}

/// Which readout a HUD text entity displays.
#[derive(Component, Clone, Copy, PartialEq, Eq)]
pub enum HudText {
    Status,
    Mode,
    Size,
    Distance,
    Thickness,
}

pub fn spawn_hud(mut commands: Commands) {
    let readout_font = TextFont {
        font_size: 16.0,
        ..default()
    };

    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                readout_font.clone(),
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                HudText::Status,
            ));
            parent.spawn((
                Text::new("Measure: off | Unit: cm"),
                readout_font.clone(),
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                HudText::Mode,
            ));
            parent.spawn((
                Text::new("Size: --"),
                readout_font.clone(),
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(60.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                HudText::Size,
            ));
            parent.spawn((
                Text::new("Distance: --"),
                readout_font.clone(),
                TextColor(Color::srgb(1.0, 0.9, 0.3)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(36.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                HudText::Distance,
            ));
            parent.spawn((
                Text::new("Thickness: --"),
                readout_font,
                TextColor(Color::srgb(1.0, 0.9, 0.3)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                HudText::Thickness,
            ));
            parent.spawn((
                Text::new("M measure | C clear | U units | G grid | L share link"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.6, 0.6)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
            ));
        });
}

pub fn update_hud(
    status: Res<StatusLine>,
    current_model: Res<CurrentModel>,
    measure_tool: Res<MeasureTool>,
    display_unit: Res<DisplayUnit>,
    mut readouts: Query<(&mut Text, &HudText)>,
) {
    let unit = display_unit.0;
    let latest = current_model
        .get()
        .and_then(|model| measure_tool.latest().map(|m| (m, model.scale_factor)));

    for (mut text, readout) in &mut readouts {
        let next = match readout {
            HudText::Status => status.message.clone(),
            HudText::Mode => {
                let mode = if measure_tool.is_active() { "on" } else { "off" };
                format!("Measure: {mode} | Unit: {}", unit.label())
            }
            HudText::Size => size_line(&current_model, unit),
            HudText::Distance => match latest {
                Some((measurement, scale_factor)) => format!(
                    "Distance: {:.2} {}",
                    to_display(measurement.distance, scale_factor, unit),
                    unit.label()
                ),
                None => "Distance: --".to_string(),
            },
            HudText::Thickness => match latest {
                Some((measurement, scale_factor)) => match measurement.thickness {
                    Some(thickness) => format!(
                        "Thickness: {:.2} {}",
                        to_display(thickness, scale_factor, unit),
                        unit.label()
                    ),
                    None => "Thickness: N/A".to_string(),
                },
                None => "Thickness: --".to_string(),
            },
        };
        if text.0 != next {
            text.0 = next;
        }
    }
}

fn size_line(current_model: &CurrentModel, unit: Unit) -> String {
    match current_model.get() {
        Some(model) => {
            let size = model.original_size;
            format!(
                "Size: {:.1} x {:.1} x {:.1} {}",
                unit.from_meters(size.x),
                unit.from_meters(size.y),
                unit.from_meters(size.z),
                unit.label()
            )
        }
        None => "Size: --".to_string(),
    }
}
