//! Shared messaging between the UI surface and the window controller
//!
//! The control channel is fire-and-forget: typed commands flow one way and
//! no acknowledgement comes back.

pub mod messages;

pub use messages::WindowCommand;
