//! Privileged window-management interface
//!
//! The overlay controller drives the platform window through this trait.
//! The concrete implementation lives in the embedding shell (Electron-style
//! main process, winit, or a test double); this crate only consumes it.

use anyhow::Result;

use crate::window::geometry::WindowGeometry;

/// Z-order tier for `set_topmost`
///
/// `ScreenSaver` sits above ordinary always-on-top windows so the overlay
/// stays visible over other pinned content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopmostLevel {
    /// Normal stacking, not pinned
    Normal,
    /// Ordinary always-on-top
    AlwaysOnTop,
    /// Highest tier, above other always-on-top windows
    ScreenSaver,
}

/// Operations the window manager must provide for the single app window
pub trait WindowBackend: Send {
    /// Current window bounds
    fn bounds(&self) -> Result<WindowGeometry>;

    /// Move and resize the window
    fn set_bounds(&mut self, bounds: WindowGeometry) -> Result<()>;

    /// Whether the window is currently maximized
    fn is_maximized(&self) -> Result<bool>;

    /// Whether the window is currently fullscreen
    fn is_full_screen(&self) -> Result<bool>;

    /// Maximize the window
    fn maximize(&mut self) -> Result<()>;

    /// Enter or leave fullscreen
    fn set_full_screen(&mut self, full_screen: bool) -> Result<()>;

    /// Pin the window at the given z-order tier
    fn set_topmost(&mut self, level: TopmostLevel) -> Result<()>;

    /// Hide or show the window in the taskbar
    fn set_skip_taskbar(&mut self, skip: bool) -> Result<()>;

    /// Let pointer input pass through to whatever is beneath the window.
    /// With `forward` set, input events are still delivered to the window
    /// for hit-testing while the click lands underneath.
    fn set_click_through(&mut self, enabled: bool, forward: bool) -> Result<()>;

    /// Minimize the window
    fn minimize(&mut self) -> Result<()>;

    /// Close the window
    fn close(&mut self) -> Result<()>;

    /// Work area of the primary display (excludes taskbar/panels)
    fn work_area(&self) -> Result<WindowGeometry>;
}
