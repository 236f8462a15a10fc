use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::{MARKER_SPHERE_SIZE, MEASURE_LINE_WIDTH};
use serde::{Deserialize, Serialize};

use crate::engine::assets::model::CurrentModel;
use crate::geometry::raycast::{PickMesh, estimate_thickness, pick_from_screen};

/// A finalised measurement pair. Immutable once recorded; distances are
/// in normalized scene space and converted only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: u32,
    pub start: Vec3,
    pub end: Vec3,
    pub distance: f32,
    /// Estimated material depth along the pair direction. `None` when no
    /// opposite surface was struck, which is distinct from zero.
    pub thickness: Option<f32>,
}

/// Result of feeding a pick point into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// Tool inactive; nothing changed.
    Ignored,
    /// First point of a new pair recorded.
    Started(Vec3),
    /// Second point closed the pair.
    Completed(Measurement),
}

/// Measurement session state machine. Owns every recorded point and pair;
/// marker entities are spawned and despawned by the systems below to
/// mirror this state.
#[derive(Resource, Default)]
pub struct MeasureTool {
    active: bool,
    start_point: Option<Vec3>,
    completed: Vec<Measurement>,
    next_id: u32,
}

impl MeasureTool {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn in_progress(&self) -> Option<Vec3> {
        self.start_point
    }

    pub fn completed(&self) -> &[Measurement] {
        &self.completed
    }

    pub fn latest(&self) -> Option<&Measurement> {
        self.completed.last()
    }

    /// Enter or leave measurement mode. Leaving discards an in-progress
    /// point but keeps finished pairs until an explicit clear.
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if !active {
            self.start_point = None;
        }
    }

    /// Record a pick point. The caller guarantees a model is loaded and
    /// the point lies on its surface; thickness is probed against `mesh`.
    pub fn pick(&mut self, point: Vec3, mesh: &PickMesh) -> PickOutcome {
        if !self.active {
            return PickOutcome::Ignored;
        }

        match self.start_point.take() {
            None => {
                self.start_point = Some(point);
                PickOutcome::Started(point)
            }
            Some(start) => {
                let measurement = Measurement {
                    id: self.next_id,
                    start,
                    end: point,
                    distance: start.distance(point),
                    thickness: estimate_thickness(start, point, mesh),
                };
                self.next_id += 1;
                self.completed.push(measurement.clone());
                PickOutcome::Completed(measurement)
            }
        }
    }

    /// Drop all points, pairs, and results and leave measurement mode.
    pub fn clear_all(&mut self) {
        self.active = false;
        self.start_point = None;
        self.completed.clear();
    }
}

/// Fired when a second pick finalises a pair.
#[derive(Event, Debug, Clone)]
pub struct MeasurementCompleted {
    pub measurement: Measurement,
}

/// Any visual owned by the measurement session.
#[derive(Component)]
pub struct MeasureMarker;

/// The marker for a first point whose pair is not yet closed.
#[derive(Component)]
pub struct PendingPointMarker;

/// Click handling: ray from the cursor through the camera, nearest model
/// hit becomes a pick point. Silently does nothing without a loaded model.
pub fn measure_tool_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut measure_tool: ResMut<MeasureTool>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    model: Res<CurrentModel>,
    mut completed_events: EventWriter<MeasurementCompleted>,
    pending_markers: Query<Entity, With<PendingPointMarker>>,
) {
    if !measure_tool.is_active() || !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(loaded) = model.get() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok((camera_transform, camera)) = cameras.single() else {
        return;
    };

    // Clicking past the model is a miss, not an error.
    let Some(hit) = pick_from_screen(cursor_pos, camera, camera_transform, &loaded.pick_mesh)
    else {
        return;
    };

    match measure_tool.pick(hit.point, &loaded.pick_mesh) {
        PickOutcome::Started(point) => {
            spawn_point_marker(&mut commands, &mut meshes, &mut materials, point, true);
        }
        PickOutcome::Completed(measurement) => {
            // The first point's marker belongs to a finished pair now.
            for entity in &pending_markers {
                commands.entity(entity).remove::<PendingPointMarker>();
            }
            spawn_point_marker(
                &mut commands,
                &mut meshes,
                &mut materials,
                measurement.end,
                false,
            );
            spawn_measure_line(&mut commands, &mut meshes, &mut materials, &measurement);

            info!(
                "Measurement {} completed: distance {:.3}, thickness {:?}",
                measurement.id, measurement.distance, measurement.thickness
            );
            completed_events.write(MeasurementCompleted { measurement });
        }
        PickOutcome::Ignored => {}
    }
}

/// Keyboard control: M toggles measurement mode, C clears everything.
pub fn measure_keyboard_system(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut measure_tool: ResMut<MeasureTool>,
    pending_markers: Query<Entity, With<PendingPointMarker>>,
    all_markers: Query<Entity, With<MeasureMarker>>,
) {
    if keyboard.just_pressed(KeyCode::KeyM) {
        let activate = !measure_tool.is_active();
        measure_tool.set_active(activate);
        if activate {
            info!("Measurement mode on");
        } else {
            // Leaving mode drops the in-progress point marker only.
            for entity in &pending_markers {
                commands.entity(entity).despawn();
            }
            info!("Measurement mode off");
        }
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        measure_tool.clear_all();
        for entity in &all_markers {
            commands.entity(entity).despawn();
        }
        info!("Measurements cleared");
    }
}

fn spawn_point_marker(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    point: Vec3,
    pending: bool,
) {
    let mut entity = commands.spawn((
        Mesh3d(meshes.add(Sphere::new(MARKER_SPHERE_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.0, 0.0),
            emissive: LinearRgba::new(1.0, 0.2, 0.2, 1.0),
            unlit: true,
            ..default()
        })),
        Transform::from_translation(point),
        MeasureMarker,
    ));
    if pending {
        entity.insert(PendingPointMarker);
    }
}

fn spawn_measure_line(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    measurement: &Measurement,
) {
    let span = measurement.end - measurement.start;
    let length = span.length();
    if length < MEASURE_LINE_WIDTH {
        return;
    }

    let midpoint = (measurement.start + measurement.end) * 0.5;
    let rotation = Quat::from_rotation_arc(Vec3::X, span / length);
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(length, MEASURE_LINE_WIDTH, MEASURE_LINE_WIDTH))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 1.0, 0.2),
            emissive: LinearRgba::new(1.0, 1.0, 0.2, 1.0),
            unlit: true,
            ..default()
        })),
        Transform::from_translation(midpoint).with_rotation(rotation),
        MeasureMarker,
    ));
}

pub struct MeasureToolPlugin;
impl Plugin for MeasureToolPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MeasureTool>()
            .add_event::<MeasurementCompleted>()
            .add_systems(Update, (measure_tool_system, measure_keyboard_system));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hollow_box() -> PickMesh {
        let mut mesh = PickMesh::default();
        for half in [5.0, 4.0] {
            let v = |x: f32, y: f32, z: f32| Vec3::new(x, y, z) * half;
            let corners = [
                v(-1.0, -1.0, -1.0),
                v(1.0, -1.0, -1.0),
                v(1.0, 1.0, -1.0),
                v(-1.0, 1.0, -1.0),
                v(-1.0, -1.0, 1.0),
                v(1.0, -1.0, 1.0),
                v(1.0, 1.0, 1.0),
                v(-1.0, 1.0, 1.0),
            ];
            const FACES: [[usize; 4]; 6] = [
                [0, 1, 2, 3],
                [4, 5, 6, 7],
                [0, 1, 5, 4],
                [2, 3, 7, 6],
                [0, 3, 7, 4],
                [1, 2, 6, 5],
            ];
            for face in FACES {
                mesh.triangles
                    .push([corners[face[0]], corners[face[1]], corners[face[2]]]);
                mesh.triangles
                    .push([corners[face[0]], corners[face[2]], corners[face[3]]]);
            }
        }
        mesh
    }

    #[test]
    fn picks_are_ignored_while_inactive() {
        let mut tool = MeasureTool::default();
        assert_eq!(
            tool.pick(Vec3::ZERO, &PickMesh::default()),
            PickOutcome::Ignored
        );
        assert!(tool.in_progress().is_none());
        assert!(tool.completed().is_empty());
    }

    #[test]
    fn two_picks_complete_a_pair_and_restart_the_cycle() {
        let mut tool = MeasureTool::default();
        tool.set_active(true);

        let p1 = Vec3::new(-5.0, -5.0, -5.0);
        let p2 = Vec3::new(5.0, 5.0, 5.0);
        assert_eq!(tool.pick(p1, &PickMesh::default()), PickOutcome::Started(p1));

        let PickOutcome::Completed(measurement) = tool.pick(p2, &PickMesh::default()) else {
            panic!("second pick should complete the pair");
        };
        // Opposite corners of the normalized 10-cube: 10 * sqrt(3).
        assert!((measurement.distance - 17.3205).abs() < 1e-3);
        assert_eq!(measurement.thickness, None);

        // Cycle loops: the session is ready for a fresh pair.
        assert!(tool.in_progress().is_none());
        assert_eq!(tool.completed().len(), 1);
        assert_eq!(tool.pick(p1, &PickMesh::default()), PickOutcome::Started(p1));
    }

    #[test]
    fn completed_pair_carries_wall_thickness() {
        let mesh = hollow_box();
        let mut tool = MeasureTool::default();
        tool.set_active(true);

        tool.pick(Vec3::new(-5.0, 0.1, 0.2), &mesh);
        let PickOutcome::Completed(measurement) =
            tool.pick(Vec3::new(5.0, 0.1, 0.2), &mesh)
        else {
            panic!("expected completed pair");
        };
        let thickness = measurement.thickness.expect("wall should be struck");
        assert!((thickness - 1.0).abs() < 1e-2);
    }

    #[test]
    fn leaving_mode_discards_single_point_without_a_distance() {
        let mut tool = MeasureTool::default();
        tool.set_active(true);
        tool.pick(Vec3::ONE, &PickMesh::default());
        assert!(tool.in_progress().is_some());

        tool.set_active(false);
        assert!(tool.in_progress().is_none());
        assert!(tool.completed().is_empty());
    }

    #[test]
    fn leaving_mode_keeps_finished_pairs() {
        let mut tool = MeasureTool::default();
        tool.set_active(true);
        tool.pick(Vec3::ZERO, &PickMesh::default());
        tool.pick(Vec3::X, &PickMesh::default());

        tool.set_active(false);
        assert_eq!(tool.completed().len(), 1);

        tool.clear_all();
        assert!(tool.completed().is_empty());
        assert!(!tool.is_active());
    }

    #[test]
    fn entering_mode_twice_is_a_no_op() {
        let mut tool = MeasureTool::default();
        tool.set_active(true);
        tool.pick(Vec3::ZERO, &PickMesh::default());
        tool.set_active(true);
        // The in-progress point survives a redundant activation.
        assert!(tool.in_progress().is_some());
    }

    #[test]
    fn outcomes_compare_by_value() {
        let mut tool = MeasureTool::default();
        tool.set_active(true);
        tool.pick(Vec3::ZERO, &PickMesh::default());
        let PickOutcome::Completed(measurement) = tool.pick(Vec3::X, &PickMesh::default())
        else {
            panic!("expected completed pair");
        };

        // Completed outcomes carry the measurement by value.
        assert_eq!(
            PickOutcome::Completed(measurement.clone()),
            PickOutcome::Completed(measurement.clone())
        );
        let mut other = measurement.clone();
        other.id += 1;
        assert_ne!(measurement, other);
    }

    #[test]
    fn pair_ids_are_unique_and_increasing() {
        let mut tool = MeasureTool::default();
        tool.set_active(true);
        for _ in 0..3 {
            tool.pick(Vec3::ZERO, &PickMesh::default());
            tool.pick(Vec3::X, &PickMesh::default());
        }
        let ids: Vec<u32> = tool.completed().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
