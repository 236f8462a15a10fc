//! Model intake and scene installation.
//!
//! Every entry point (command-line argument, dropped file, decoded share
//! link) funnels into the same pipeline: extension gate, parse, bounds,
//! normalization, spawn. A failed load never disturbs the previously
//! loaded model.

/// Minimal glTF 2.0 triangle extraction for `.glb` and embedded `.gltf`.
pub mod gltf;

/// Load request events, file and share-link intake, and the system that
/// normalizes and installs a parsed model into the scene.
pub mod model_loader;
