//! Interactive measurement tooling.
//!
//! One tool is exposed: two-point distance/thickness measurement against
//! the loaded model.
//!
//! ## Measurement flow
//!
//! ```text
//! M key
//!   └─> MeasureTool::set_active(true)        Inactive -> Active/Empty
//! Left click (hit on model)
//!   └─> MeasureTool::pick()
//!       ├─> first point recorded             Active/Empty -> Active/OnePoint
//!       └─> second point finalises the pair  Active/OnePoint -> Active/Empty
//!           ├─> distance + thickness computed in normalized space
//!           └─> MeasurementCompleted event emitted
//! M key (while active) discards an in-progress point, keeps finished pairs
//! C key clears every pair and marker and deactivates the tool
//! ```
//!
//! Picks are ignored while the tool is inactive or no model is loaded.
//! Completed pairs are immutable; loading a new model clears the session.

/// Two-point measurement tool: session state machine, input handling,
/// and marker/line visuals.
pub mod measure;
