//! Application Coordinator
//!
//! Wires the window controller thread, the sync client, and the push-channel
//! connection together and hands out the channels the UI surface talks to.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{unbounded, Sender};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::shared::WindowCommand;
use crate::sync::{
    ConnectionManager, HttpGateway, RefereeMirror, SyncClient, WindowTracker, WsSource,
};
use crate::window::{
    run_window_controller, OverlayController, OverlayOptions, WindowBackend,
};

/// Main application coordinator
pub struct ScoreOverlayApp {
    /// Command side of the realtime sync client
    pub sync: Arc<SyncClient>,
    /// Push-channel lifecycle owner
    pub connection: Arc<ConnectionManager>,
    /// Sender half of the window control channel
    window_tx: Sender<WindowCommand>,
    /// Handle to the window controller thread
    window_handle: Option<JoinHandle<()>>,
    /// Tracking feed address
    tracking_url: String,
    /// Cancelled on drop; stops the connection task and any tracker
    shutdown: CancellationToken,
}

impl ScoreOverlayApp {
    /// Create the coordinator around a platform window backend
    pub fn new<B: WindowBackend + 'static>(config: &AppConfig, backend: B) -> Result<Self> {
        let mirror = Arc::new(RwLock::new(RefereeMirror::new()));

        let gateway = Arc::new(HttpGateway::new(config.backend.base_url.clone()));
        let sync = Arc::new(SyncClient::new(gateway, mirror.clone()));

        let source = Arc::new(WsSource::new(config.backend.ws_url.clone()));
        let connection = Arc::new(ConnectionManager::new(
            source,
            mirror,
            Duration::from_millis(config.sync.reconnect_delay_ms),
        ));

        let options = OverlayOptions {
            default_size: (config.overlay.default_width, config.overlay.default_height),
            reset_click_through_on_exit: config.overlay.reset_click_through_on_exit,
        };
        let controller = OverlayController::new(backend, options);

        let (window_tx, window_rx) = unbounded();
        let window_handle = std::thread::spawn(move || {
            run_window_controller(controller, window_rx);
        });

        Ok(Self {
            sync,
            connection,
            window_tx,
            window_handle: Some(window_handle),
            tracking_url: config.backend.tracking_url.clone(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Sender for the fire-and-forget window control channel
    pub fn window_commands(&self) -> Sender<WindowCommand> {
        self.window_tx.clone()
    }

    /// Open the push channel (idempotent while a session is live).
    /// Must be called from within the tokio runtime.
    pub fn start_sync(&self) {
        self.connection.connect();
    }

    /// Start following the named external window, snapping the overlay onto
    /// it until the feed closes or the app shuts down.
    /// Must be called from within the tokio runtime.
    pub fn track_window(&self, title: impl Into<String>) {
        let tracker = WindowTracker::new(self.tracking_url.clone());
        let title = title.into();
        let commands = self.window_tx.clone();
        let shutdown = self.shutdown.child_token();
        tokio::spawn(async move {
            if let Err(e) = tracker.track(&title, commands, shutdown).await {
                error!(error = %e, "window tracking failed");
            }
        });
    }
}

impl Drop for ScoreOverlayApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.connection.shutdown();

        // Closing the control channel stops the controller thread
        let (stub_tx, _) = unbounded();
        let _ = std::mem::replace(&mut self.window_tx, stub_tx);
        if let Some(handle) = self.window_handle.take() {
            let _ = handle.join();
        }
        info!("app coordinator shut down");
    }
}
