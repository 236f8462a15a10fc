use bevy::prelude::*;
use thiserror::Error;

/// Target size for the largest model dimension after normalization.
pub const REFERENCE_SIZE: f32 = 10.0;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("model contains no renderable geometry")]
    EmptyGeometry,
}

/// Axis-aligned bounding box in pre-normalization model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Fold a point set into its bounding box. `None` for an empty set.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self { min: first, max: first };
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Bounds with no usable extent: non-finite, inverted, or zero in every axis.
    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        if !size.is_finite() || size.min_element() < 0.0 {
            return true;
        }
        size.max_element() <= f32::EPSILON
    }
}

/// Result of normalizing a model's bounds. Describes the transform that
/// centres the model at the origin and scales its largest dimension to
/// [`REFERENCE_SIZE`]; applying it is the loader's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Uniform scale applied to the model.
    pub scale_factor: f32,
    /// Pre-scale extents, in source units.
    pub original_size: Vec3,
    /// Pre-scale bounds centre, mapped to the origin.
    pub center: Vec3,
}

impl Normalization {
    /// Transform for the model root. Translation is pre-scaled so the TRS
    /// order (scale, then translate) lands the bounds centre exactly on
    /// the origin.
    pub fn to_transform(&self) -> Transform {
        Transform {
            translation: -self.center * self.scale_factor,
            scale: Vec3::splat(self.scale_factor),
            ..default()
        }
    }

    /// Map a model-space point into normalized scene space.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        (point - self.center) * self.scale_factor
    }
}

/// Compute the normalization for a model's bounding box.
///
/// Pure: callers apply the returned transform to the scene root exactly
/// once per load. Degenerate bounds are rejected so a bad model never
/// replaces a previously loaded one.
pub fn normalize_bounds(bounds: &Aabb) -> Result<Normalization, NormalizeError> {
    if bounds.is_degenerate() {
        return Err(NormalizeError::EmptyGeometry);
    }

    let size = bounds.size();
    let max_dim = size.max_element();

    Ok(Normalization {
        scale_factor: REFERENCE_SIZE / max_dim,
        original_size: size,
        center: bounds.center(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_corners(center: Vec3, half: Vec3) -> Vec<Vec3> {
        let mut corners = Vec::with_capacity(8);
        for &sx in &[-1.0, 1.0] {
            for &sy in &[-1.0, 1.0] {
                for &sz in &[-1.0, 1.0] {
                    corners.push(center + half * Vec3::new(sx, sy, sz));
                }
            }
        }
        corners
    }

    #[test]
    fn unit_cube_off_origin_scales_to_reference_size() {
        let bounds =
            Aabb::from_points(box_corners(Vec3::splat(5.0), Vec3::splat(0.5))).unwrap();
        let norm = normalize_bounds(&bounds).unwrap();

        assert!((norm.scale_factor - 10.0).abs() < 1e-6);
        assert!((norm.original_size - Vec3::ONE).length() < 1e-6);
        assert!((norm.center - Vec3::splat(5.0)).length() < 1e-6);

        // Corners of the normalized cube land at +-5 around the origin.
        let corner = norm.apply(Vec3::splat(5.5));
        assert!((corner - Vec3::splat(5.0)).length() < 1e-4);
        let corner = norm.apply(Vec3::splat(4.5));
        assert!((corner - Vec3::splat(-5.0)).length() < 1e-4);
    }

    #[test]
    fn normalized_bounds_are_centred_with_max_extent_at_reference() {
        let corners = box_corners(Vec3::new(-3.0, 7.5, 0.25), Vec3::new(1.0, 1.5, 2.0));
        let bounds = Aabb::from_points(corners.iter().copied()).unwrap();
        let norm = normalize_bounds(&bounds).unwrap();

        let recomputed =
            Aabb::from_points(corners.iter().map(|&p| norm.apply(p))).unwrap();
        assert!(recomputed.center().length() < 1e-4);
        assert!((recomputed.size().max_element() - REFERENCE_SIZE).abs() < 1e-4);
    }

    #[test]
    fn transform_matches_pure_mapping() {
        let bounds =
            Aabb::from_points(box_corners(Vec3::new(2.0, -1.0, 4.0), Vec3::splat(3.0)))
                .unwrap();
        let norm = normalize_bounds(&bounds).unwrap();
        let transform = norm.to_transform();

        let p = Vec3::new(3.5, -2.0, 6.0);
        let via_transform = transform.transform_point(p);
        assert!((via_transform - norm.apply(p)).length() < 1e-4);
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());

        let point = Aabb::from_points([Vec3::splat(1.0)]).unwrap();
        assert_eq!(normalize_bounds(&point), Err(NormalizeError::EmptyGeometry));

        let flat = Aabb {
            min: Vec3::new(0.0, 0.0, f32::NAN),
            max: Vec3::new(1.0, 1.0, f32::NAN),
        };
        assert_eq!(normalize_bounds(&flat), Err(NormalizeError::EmptyGeometry));
    }

    #[test]
    fn flat_but_extended_bounds_still_normalize() {
        // A plane-like model has a zero extent on one axis; the largest
        // dimension still defines the scale.
        let bounds = Aabb {
            min: Vec3::new(0.0, 0.0, 0.0),
            max: Vec3::new(4.0, 0.0, 2.0),
        };
        let norm = normalize_bounds(&bounds).unwrap();
        assert!((norm.scale_factor - 2.5).abs() < 1e-6);
    }
}
