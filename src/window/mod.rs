//! Overlay Window State Machine
//!
//! Converts the application window into a borderless always-on-top overlay
//! anchored to arbitrary screen coordinates and restores the previous
//! placement losslessly on the way back. The platform window itself is
//! reached through the `WindowBackend` trait; this module owns only the
//! state machine.

pub mod backend;
pub mod controller;
pub mod geometry;

pub use backend::{TopmostLevel, WindowBackend};
pub use controller::{run_window_controller, OverlayController, OverlayMode, OverlayOptions};
pub use geometry::{SavedWindowState, WindowGeometry};
