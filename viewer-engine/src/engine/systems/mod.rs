/// On-screen readouts and keyboard controls for the viewer session.
pub mod controls;
pub mod hud;
