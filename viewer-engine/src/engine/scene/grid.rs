use bevy::prelude::*;
use constants::render_settings::{AXIS_LENGTH, GRID_CELL_COUNT, GRID_CELL_SIZE, GRID_Y_OFFSET};

/// Shared visibility for the ground grid and axis lines. Presentation
/// only; measurements are unaffected.
#[derive(Resource)]
pub struct OverlayVisibility {
    pub visible: bool,
}

impl Default for OverlayVisibility {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Immediate-mode overlay drawing, rebuilt every frame.
pub fn draw_overlays(mut gizmos: Gizmos, overlay: Res<OverlayVisibility>) {
    if !overlay.visible {
        return;
    }

    // Ground grid sits just below y = 0 so it never z-fights the model.
    gizmos.grid(
        Isometry3d::new(
            Vec3::new(0.0, GRID_Y_OFFSET, 0.0),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        ),
        UVec2::splat(GRID_CELL_COUNT),
        Vec2::splat(GRID_CELL_SIZE),
        Color::srgba(1.0, 1.0, 1.0, 0.35),
    );

    gizmos.line(Vec3::ZERO, Vec3::X * AXIS_LENGTH, Color::srgb(1.0, 0.2, 0.2));
    gizmos.line(Vec3::ZERO, Vec3::Y * AXIS_LENGTH, Color::srgb(0.2, 1.0, 0.2));
    gizmos.line(Vec3::ZERO, Vec3::Z * AXIS_LENGTH, Color::srgb(0.2, 0.4, 1.0));
}
