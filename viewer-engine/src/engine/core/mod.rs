//! Core application setup.
//!
//! Handles plugin initialisation, window configuration, and the system
//! schedule for the viewer session.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with the load pipeline, measurement tool,
/// overlays, and HUD wired into the schedule.
pub mod app_setup;

/// Window configuration and vsync settings.
pub mod window_config;
