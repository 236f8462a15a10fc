/// Grid and axis overlays with a shared visibility toggle.
pub mod grid;

/// Ambient and directional lighting for model display.
pub mod lighting;
