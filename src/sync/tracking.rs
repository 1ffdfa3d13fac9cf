//! Window tracking feed
//!
//! Subscribes to the backend's tracking channel for the on-screen rectangle
//! of a named external window and republishes it as overlay snap commands,
//! so the overlay follows that window live. The feed is explicitly
//! re-initiated by the UI after a close; there is no auto-reconnect here.

use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::shared::WindowCommand;
use crate::sync::messages::TrackingFrame;
use crate::window::geometry::WindowGeometry;

/// Client for the backend tracking channel
pub struct WindowTracker {
    url: String,
}

impl WindowTracker {
    /// Create a tracker against the tracking channel URL, e.g.
    /// `ws://127.0.0.1:8000/ws/tracking`
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Track the window with the given title until the channel closes or the
    /// token is cancelled. Each new rectangle becomes a
    /// `SetOverlayMode { active: true, bounds }` command.
    pub async fn track(
        &self,
        title: &str,
        commands: Sender<WindowCommand>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()> {
        let (mut ws, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        ws.send(Message::Text(title.to_string())).await?;
        info!(title, "window tracking started");

        let mut last_emitted: Option<WindowGeometry> = None;
        loop {
            let frame = tokio::select! {
                _ = shutdown.cancelled() => break,
                frame = ws.next() => frame,
            };
            match frame {
                Some(Ok(Message::Text(text))) => {
                    let parsed: TrackingFrame = match serde_json::from_str(&text) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            warn!(error = %e, "discarding malformed tracking frame");
                            continue;
                        }
                    };
                    if let Some(bounds) = next_snap(&mut last_emitted, &parsed) {
                        if commands
                            .send(WindowCommand::SetOverlayMode {
                                active: true,
                                bounds: Some(bounds),
                            })
                            .is_err()
                        {
                            // Window controller is gone; nothing left to snap
                            break;
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "tracking channel error");
                    break;
                }
                None => {
                    info!("tracking channel closed");
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Decide whether a frame changes the overlay bounds.
///
/// The feed repeats the same rectangle at ~50 ms cadence; only a new
/// rectangle is worth a command. Lost-target frames emit nothing and leave
/// the overlay at its last applied bounds.
fn next_snap(
    last_emitted: &mut Option<WindowGeometry>,
    frame: &TrackingFrame,
) -> Option<WindowGeometry> {
    let bounds = match frame.geometry() {
        Some(bounds) => bounds,
        None => {
            if !frame.found {
                debug!("tracked window not found");
            }
            return None;
        }
    };
    if *last_emitted == Some(bounds) {
        return None;
    }
    *last_emitted = Some(bounds);
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(x: i32, y: i32, width: u32, height: u32) -> TrackingFrame {
        TrackingFrame {
            found: true,
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            is_active: Some(true),
        }
    }

    fn lost() -> TrackingFrame {
        TrackingFrame {
            found: false,
            x: None,
            y: None,
            width: None,
            height: None,
            is_active: None,
        }
    }

    #[test]
    fn test_first_frame_emits() {
        let mut last = None;
        assert_eq!(
            next_snap(&mut last, &found(10, 10, 640, 480)),
            Some(WindowGeometry::new(10, 10, 640, 480))
        );
    }

    #[test]
    fn test_repeated_rectangle_deduplicated() {
        let mut last = None;
        assert!(next_snap(&mut last, &found(10, 10, 640, 480)).is_some());
        assert!(next_snap(&mut last, &found(10, 10, 640, 480)).is_none());
        assert!(next_snap(&mut last, &found(15, 10, 640, 480)).is_some());
    }

    #[test]
    fn test_lost_target_emits_nothing_and_keeps_last() {
        let mut last = None;
        assert!(next_snap(&mut last, &found(10, 10, 640, 480)).is_some());
        assert!(next_snap(&mut last, &lost()).is_none());
        // Target reappears where it was: overlay is already there
        assert!(next_snap(&mut last, &found(10, 10, 640, 480)).is_none());
    }
}
