//! Measurement core: bounds normalization, ray casting, and unit conversion.
//!
//! Everything in this module is pure and ECS-free so it can be tested
//! without a rendering context. The loading pipeline and the measure tool
//! apply these results to the scene; they never recompute them.

/// Axis-aligned bounds and the centre-and-scale normalization descriptor.
///
/// Models are re-centred at the origin and uniformly scaled so their largest
/// dimension matches [`normalize::REFERENCE_SIZE`].
pub mod normalize;

/// Ray-triangle intersection against the loaded model and thickness estimation.
///
/// Returns ordered intersections along a ray; a miss is an empty result, not an error.
pub mod raycast;

/// Display-unit conversion of normalized-space distances back to real-world scale.
pub mod units;
