//! Message types for communication between the UI surface and the window controller

use serde::{Deserialize, Serialize};

use crate::window::geometry::WindowGeometry;

/// Fire-and-forget commands sent from the UI surface to the window controller.
///
/// No acknowledgement is returned to the sender; every command must stay
/// idempotent under duplicate delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowCommand {
    /// Enter or leave overlay mode, optionally snapping to target bounds
    #[serde(rename_all = "camelCase")]
    SetOverlayMode {
        active: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bounds: Option<WindowGeometry>,
    },
    /// Toggle click-through (pointer input passes to underlying content)
    SetIgnoreMouse(bool),
    /// Minimize the window
    WindowMin,
    /// Close the window
    WindowClose,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overlay_mode_wire_format() {
        let cmd = WindowCommand::SetOverlayMode {
            active: true,
            bounds: Some(WindowGeometry::new(10, 20, 300, 200)),
        };

        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "setOverlayMode": {
                    "active": true,
                    "bounds": {"x": 10, "y": 20, "width": 300, "height": 200}
                }
            })
        );
    }

    #[test]
    fn test_set_overlay_mode_bounds_optional() {
        let json = serde_json::json!({"setOverlayMode": {"active": false}});
        let cmd: WindowCommand = serde_json::from_value(json).unwrap();
        assert_eq!(
            cmd,
            WindowCommand::SetOverlayMode {
                active: false,
                bounds: None
            }
        );
    }

    #[test]
    fn test_chrome_commands_roundtrip() {
        for cmd in [
            WindowCommand::SetIgnoreMouse(true),
            WindowCommand::WindowMin,
            WindowCommand::WindowClose,
        ] {
            let json = serde_json::to_string(&cmd).unwrap();
            let back: WindowCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(cmd, back);
        }
    }
}
