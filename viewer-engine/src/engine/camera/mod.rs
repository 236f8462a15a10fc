use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

/// Orbit camera state. The camera circles the origin, where normalized
/// models are centred; the transform itself is driven by
/// [`camera_controller`] with damped interpolation.
#[derive(Resource)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for ViewportCamera {
    fn default() -> Self {
        // Start where the camera can see a full reference-size model:
        // (5, 5, 5) looking at the origin.
        Self {
            focus_point: Vec3::ZERO,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: -0.6155,
            distance: Vec3::splat(5.0).length(),
        }
    }
}

impl ViewportCamera {
    fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    // Right-drag orbits around the focus point.
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;
        viewport_camera.yaw -= mouse_delta.x * yaw_sens;
        viewport_camera.pitch -= mouse_delta.y * pitch_sens;
        viewport_camera.pitch = viewport_camera.pitch.clamp(-1.55, 1.55);
    }

    // Mouse wheel scroll accumulation (pixel and line scroll)
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    // Dolly toward or away from the focus point.
    if scroll_accum.abs() > f32::EPSILON {
        let dolly_speed = (viewport_camera.distance * 0.15).clamp(0.2, 20.0);
        viewport_camera.distance =
            (viewport_camera.distance - scroll_accum * dolly_speed).clamp(1.0, 120.0);
    }

    let target_rot = viewport_camera.rotation();
    let target_pos =
        viewport_camera.focus_point + target_rot * Vec3::Z * viewport_camera.distance;

    // Damped follow toward the orbit target.
    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target_pos, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target_rot, lerp_speed);
}
