//! Window geometry primitives
//!
//! Plain screen-coordinate rectangles and the saved placement snapshot used
//! to restore the window after leaving overlay mode.

use serde::{Deserialize, Serialize};

/// A window rectangle in integer screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowGeometry {
    /// Create a new geometry from position and size
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// A rectangle of the given size centered inside this one
    pub fn centered(&self, width: u32, height: u32) -> WindowGeometry {
        WindowGeometry {
            x: self.x + (self.width.saturating_sub(width) / 2) as i32,
            y: self.y + (self.height.saturating_sub(height) / 2) as i32,
            width,
            height,
        }
    }
}

/// Snapshot of the window placement taken when entering overlay mode.
///
/// Invariant: `geometry` is `Some` iff the window was neither maximized nor
/// fullscreen at snapshot time. The controller overwrites this on every entry
/// from normal mode and takes it exactly once on exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedWindowState {
    /// Bounds to restore, absent while maximized or fullscreen
    pub geometry: Option<WindowGeometry>,
    /// Window was maximized when the snapshot was taken
    pub is_maximized: bool,
    /// Window was fullscreen when the snapshot was taken
    pub is_full_screen: bool,
}

impl SavedWindowState {
    /// Take the snapshot out, leaving the empty default behind
    pub fn take(&mut self) -> SavedWindowState {
        std::mem::take(self)
    }

    /// Whether anything was captured at all
    pub fn is_empty(&self) -> bool {
        self.geometry.is_none() && !self.is_maximized && !self.is_full_screen
    }
}
