use bevy::prelude::*;

/// Rejection threshold for rays parallel to a triangle plane.
const RAY_EPSILON: f32 = 1e-7;

/// Offset applied to the thickness ray origin so a pick point sitting
/// exactly on the surface does not intersect itself at distance zero.
const SELF_HIT_OFFSET: f32 = 1e-3;

/// Flattened triangle soup in normalized scene space, gathered from every
/// renderable primitive of the loaded model (nested nodes included).
#[derive(Debug, Clone, Default)]
pub struct PickMesh {
    pub triangles: Vec<[Vec3; 3]>,
}

impl PickMesh {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// A ray-surface intersection, in normalized scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub point: Vec3,
    pub distance: f32,
}

/// Cast a ray against the pick mesh and return every intersection, sorted
/// ascending by distance. A miss (or an empty mesh) is an empty vec, never
/// an error: clicking past the model is the common case.
pub fn cast(origin: Vec3, direction: Vec3, mesh: &PickMesh) -> Vec<Hit> {
    let mut hits: Vec<Hit> = mesh
        .triangles
        .iter()
        .filter_map(|tri| {
            ray_triangle_intersect(origin, direction, tri)
                .map(|t| Hit { point: origin + direction * t, distance: t })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Convert a cursor position into a camera ray and return the nearest hit.
pub fn pick_from_screen(
    cursor_pos: Vec2,
    camera: &Camera,
    camera_transform: &GlobalTransform,
    mesh: &PickMesh,
) -> Option<Hit> {
    let ray = camera.viewport_to_world(camera_transform, cursor_pos).ok()?;
    cast(ray.origin, ray.direction.as_vec3(), mesh).into_iter().next()
}

/// Estimate material thickness for a completed measurement pair.
///
/// Casts from the first picked point along the pair direction, with the
/// origin nudged forward so the pick surface itself is not counted. More
/// than one hit means the ray re-entered the model; thickness is the
/// distance from `p1` to that near surface. Zero or one hit means no
/// opposite surface exists and thickness is unavailable (distinct from 0).
pub fn estimate_thickness(p1: Vec3, p2: Vec3, mesh: &PickMesh) -> Option<f32> {
    let Some(direction) = (p2 - p1).try_normalize() else {
        return None;
    };

    let hits = cast(p1 + direction * SELF_HIT_OFFSET, direction, mesh);
    if hits.len() > 1 {
        Some(SELF_HIT_OFFSET + hits[0].distance)
    } else {
        None
    }
}

/// Moeller-Trumbore ray-triangle intersection. Returns the distance along
/// the ray, or `None` for a miss or a hit behind the origin.
fn ray_triangle_intersect(origin: Vec3, direction: Vec3, tri: &[Vec3; 3]) -> Option<f32> {
    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];

    let h = direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < RAY_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - tri[0];
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > RAY_EPSILON { Some(t) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_cube(mesh: &mut PickMesh, center: Vec3, half: f32) {
        let v = |x: f32, y: f32, z: f32| center + Vec3::new(x, y, z) * half;
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

    fn cube(center: Vec3, half: f32) -> PickMesh {
        let mut mesh = PickMesh::default();
        push_cube(&mut mesh, center, half);
        mesh
    }

    #[test]
    fn ray_triangle_hit() {
        let tri = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
        ];
        let t = ray_triangle_intersect(Vec3::new(0.5, 0.5, 1.0), Vec3::NEG_Z, &tri).unwrap();
        assert!((t - 1.0).abs() < 1e-6, "expected t=1.0, got {t}");
    }

    #[test]
    fn ray_triangle_miss_and_behind() {
        let tri = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
        ];
        assert!(ray_triangle_intersect(Vec3::new(5.0, 5.0, 1.0), Vec3::NEG_Z, &tri).is_none());
        assert!(ray_triangle_intersect(Vec3::new(0.5, 0.5, -1.0), Vec3::NEG_Z, &tri).is_none());
    }

    #[test]
    fn miss_and_empty_mesh_return_empty() {
        let mesh = cube(Vec3::ZERO, 5.0);
        assert!(cast(Vec3::new(0.0, 20.0, 0.0), Vec3::Y, &mesh).is_empty());
        assert!(cast(Vec3::ZERO, Vec3::X, &PickMesh::default()).is_empty());
    }

    #[test]
    fn convex_solid_yields_entry_and_exit_sorted() {
        let mesh = cube(Vec3::ZERO, 5.0);
        // Off the face diagonals so the ray crosses one triangle per face.
        let hits = cast(Vec3::new(-20.0, 0.1, 0.2), Vec3::X, &mesh);

        assert_eq!(hits.len(), 2);
        assert!(hits[0].distance < hits[1].distance);
        assert!((hits[0].distance - 15.0).abs() < 1e-3);
        assert!((hits[1].distance - 25.0).abs() < 1e-3);
        assert!((hits[0].point.x - (-5.0)).abs() < 1e-3);
    }

    #[test]
    fn pick_mesh_hits_are_in_scene_space() {
        let mesh = cube(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let hits = cast(Vec3::new(-5.0, 0.1, 0.1), Vec3::X, &mesh);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].point - Vec3::new(1.0, 0.1, 0.1)).length() < 1e-3);
    }

    #[test]
    fn thickness_of_hollow_box_is_wall_depth() {
        // Outer shell half-size 5, inner cavity half-size 4: walls 1 thick.
        let mut mesh = cube(Vec3::ZERO, 5.0);
        push_cube(&mut mesh, Vec3::ZERO, 4.0);

        let p1 = Vec3::new(-5.0, 0.1, 0.2);
        let p2 = Vec3::new(5.0, 0.1, 0.2);
        let thickness = estimate_thickness(p1, p2, &mesh).unwrap();
        assert!((thickness - 1.0).abs() < 1e-2, "got {thickness}");
    }

    #[test]
    fn thickness_unavailable_without_second_surface() {
        // Solid convex cube: the offset ray exits through one face only.
        let mesh = cube(Vec3::ZERO, 5.0);
        let p1 = Vec3::new(-5.0, 0.1, 0.2);
        let p2 = Vec3::new(5.0, 0.1, 0.2);
        assert_eq!(estimate_thickness(p1, p2, &mesh), None);

        // Degenerate pair has no direction.
        assert_eq!(estimate_thickness(p1, p1, &mesh), None);

        // No geometry at all.
        assert_eq!(estimate_thickness(p1, p2, &PickMesh::default()), None);
    }
}
