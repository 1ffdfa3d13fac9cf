//! Overlay State Controller
//!
//! Turns the normal application window into a borderless, always-on-top,
//! taskbar-hidden overlay and reverses the transformation losslessly. Driven
//! by `WindowCommand` messages arriving on a crossbeam channel from the UI
//! surface; underlying window-manager failures are swallowed since the
//! command can only have come from the window's own UI.

use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::shared::WindowCommand;
use crate::window::backend::{TopmostLevel, WindowBackend};
use crate::window::geometry::{SavedWindowState, WindowGeometry};

/// Presentation mode of the application window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    Normal,
    Overlay,
}

/// Controller tunables derived from the application configuration
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    /// Size restored when no placement was ever saved
    pub default_size: (u32, u32),
    /// Clear click-through when leaving overlay mode instead of keeping it
    /// sticky across sessions
    pub reset_click_through_on_exit: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            default_size: (900, 670),
            reset_click_through_on_exit: false,
        }
    }
}

/// Overlay window state machine
///
/// Owns the saved placement snapshot explicitly rather than keeping it in
/// ambient storage, so a second window would get its own controller.
pub struct OverlayController<B: WindowBackend> {
    backend: B,
    mode: OverlayMode,
    saved: SavedWindowState,
    click_through: bool,
    options: OverlayOptions,
}

impl<B: WindowBackend> OverlayController<B> {
    /// Create a controller around a window in normal mode
    pub fn new(backend: B, options: OverlayOptions) -> Self {
        Self {
            backend,
            mode: OverlayMode::Normal,
            saved: SavedWindowState::default(),
            click_through: false,
            options,
        }
    }

    /// Current presentation mode
    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    /// Whether pointer input currently passes through the window
    pub fn click_through(&self) -> bool {
        self.click_through
    }

    /// Enter overlay mode, snapping to `target` bounds or covering the
    /// primary display's work area.
    ///
    /// Idempotent: re-running while already in overlay mode applies the new
    /// bounds but does not overwrite the saved placement.
    pub fn enter_overlay(&mut self, target: Option<WindowGeometry>) {
        if self.mode == OverlayMode::Normal {
            self.saved = self.snapshot();
            debug!(saved = ?self.saved, "saved window placement");
        }

        let bounds = match target {
            Some(bounds) => bounds,
            None => self.full_work_area(),
        };

        log_window_err("set_bounds", self.backend.set_bounds(bounds));
        log_window_err("set_topmost", self.backend.set_topmost(TopmostLevel::ScreenSaver));
        log_window_err("set_skip_taskbar", self.backend.set_skip_taskbar(true));

        self.mode = OverlayMode::Overlay;
        info!(?bounds, "entered overlay mode");
    }

    /// Leave overlay mode and restore the saved placement.
    ///
    /// Restore priority: fullscreen flag, then maximized flag, then saved
    /// geometry, then the default size centered on the primary display.
    /// Idempotent: a second call with nothing saved reapplies the default.
    pub fn exit_overlay(&mut self) {
        log_window_err("set_topmost", self.backend.set_topmost(TopmostLevel::Normal));
        log_window_err("set_skip_taskbar", self.backend.set_skip_taskbar(false));

        let saved = self.saved.take();
        if saved.is_full_screen {
            log_window_err("set_full_screen", self.backend.set_full_screen(true));
        } else if saved.is_maximized {
            log_window_err("maximize", self.backend.maximize());
        } else if let Some(geometry) = saved.geometry {
            log_window_err("set_bounds", self.backend.set_bounds(geometry));
        } else {
            let (width, height) = self.options.default_size;
            let bounds = self.full_work_area().centered(width, height);
            log_window_err("set_bounds", self.backend.set_bounds(bounds));
        }

        self.mode = OverlayMode::Normal;
        if self.options.reset_click_through_on_exit && self.click_through {
            self.set_click_through(false);
        }
        info!("left overlay mode");
    }

    /// Toggle click-through. Independent of overlay mode and never saved or
    /// restored; while enabled, input events are still forwarded to the
    /// window for hit-testing.
    pub fn set_click_through(&mut self, enabled: bool) {
        log_window_err(
            "set_click_through",
            self.backend.set_click_through(enabled, enabled),
        );
        self.click_through = enabled;
        debug!(enabled, "click-through updated");
    }

    /// Apply a single control-channel command
    pub fn handle(&mut self, command: WindowCommand) {
        match command {
            WindowCommand::SetOverlayMode { active: true, bounds } => self.enter_overlay(bounds),
            WindowCommand::SetOverlayMode { active: false, .. } => self.exit_overlay(),
            WindowCommand::SetIgnoreMouse(ignore) => self.set_click_through(ignore),
            WindowCommand::WindowMin => log_window_err("minimize", self.backend.minimize()),
            WindowCommand::WindowClose => log_window_err("close", self.backend.close()),
        }
    }

    fn snapshot(&self) -> SavedWindowState {
        let is_maximized = self.backend.is_maximized().unwrap_or(false);
        let is_full_screen = self.backend.is_full_screen().unwrap_or(false);
        let geometry = if !is_maximized && !is_full_screen {
            self.backend.bounds().ok()
        } else {
            None
        };
        SavedWindowState {
            geometry,
            is_maximized,
            is_full_screen,
        }
    }

    fn full_work_area(&self) -> WindowGeometry {
        self.backend.work_area().unwrap_or_else(|e| {
            warn!(error = %e, "work area query failed, assuming 1920x1080");
            WindowGeometry::new(0, 0, 1920, 1080)
        })
    }
}

/// Window-manager failures are not actionable here: the window either still
/// exists (call succeeded) or is gone (nothing to recover). Log and move on.
fn log_window_err(op: &str, result: anyhow::Result<()>) {
    if let Err(e) = result {
        warn!(op, error = %e, "window operation failed");
    }
}

/// Drain the control channel until every sender is dropped.
///
/// Runs on a dedicated thread owned by the app coordinator; the channel is
/// the only way the UI surface reaches the window.
pub fn run_window_controller<B: WindowBackend>(
    mut controller: OverlayController<B>,
    commands: Receiver<WindowCommand>,
) {
    info!("window controller started");
    for command in commands {
        controller.handle(command);
    }
    info!("window controller stopped");
}
