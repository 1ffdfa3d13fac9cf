//! ScoreOverlay - Live referee scoring overlay client
//!
//! Maintains a realtime mirror of per-referee scores pushed by the scoring
//! backend and drives the overlay presentation state of the app window.
//! This binary runs the sync client headless for diagnostics; the UI shell
//! embeds the same components through `app::ScoreOverlayApp`.

mod app;
mod config;
mod shared;
mod sync;
mod window;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use parking_lot::RwLock;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::sync::{ConnectionManager, HttpGateway, RefereeMirror, SyncClient, WsSource};

/// ScoreOverlay - live referee scoring client (headless diagnostics)
#[derive(Parser, Debug)]
#[command(name = "score-overlay")]
#[command(about = "Realtime sync client for the referee scoring backend")]
struct Args {
    /// Path to the configuration file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the backend control endpoint base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the backend push channel URL
    #[arg(long)]
    ws_url: Option<String>,

    /// Run a device scan and exit
    #[arg(long)]
    scan: bool,

    /// Force a full rescan instead of the cached device list (with --scan)
    #[arg(long)]
    flush: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = load_or_create_config(args.config.as_deref());
    if let Some(base_url) = args.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(ws_url) = args.ws_url {
        config.backend.ws_url = ws_url;
    }

    info!("ScoreOverlay starting...");
    info!(backend = %config.backend.base_url, push = %config.backend.ws_url);

    let mirror = Arc::new(RwLock::new(RefereeMirror::new()));
    let gateway = Arc::new(HttpGateway::new(config.backend.base_url.clone()));
    let sync = SyncClient::new(gateway, mirror.clone());

    if args.scan {
        return run_scan(&sync, args.flush).await;
    }

    run_watch(&config, mirror).await
}

/// Load configuration from file or create default
fn load_or_create_config(path: Option<&std::path::Path>) -> AppConfig {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match config::default_config_path() {
            Ok(path) => path,
            Err(_) => {
                info!("Using default configuration");
                return AppConfig::default();
            }
        },
    };

    if path.exists() {
        if let Ok(config) = config::load_config(&path) {
            info!("Loaded configuration from {:?}", path);
            return config;
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Query the backend device list and print it
async fn run_scan(sync: &SyncClient, flush: bool) -> Result<()> {
    if flush {
        info!("Forcing a full rescan (this can take several seconds)...");
    }
    let devices = sync.scan(flush).await?;

    if devices.is_empty() {
        println!("No devices found");
        return Ok(());
    }
    println!("Discovered devices:");
    for device in &devices {
        println!(
            "  {} <{}> rssi {}{}",
            device.name,
            device.address,
            device.rssi,
            if device.is_target { " (target)" } else { "" }
        );
    }
    Ok(())
}

/// Follow the push channel, logging connectivity and score changes until
/// interrupted
async fn run_watch(config: &AppConfig, mirror: Arc<RwLock<RefereeMirror>>) -> Result<()> {
    let source = Arc::new(WsSource::new(config.backend.ws_url.clone()));
    let connection = Arc::new(ConnectionManager::new(
        source,
        mirror.clone(),
        Duration::from_millis(config.sync.reconnect_delay_ms),
    ));
    connection.connect();

    let mut state = connection.state();
    let mut summary = tokio::time::interval(Duration::from_secs(5));
    summary.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                info!(state = ?*state.borrow(), "connection state");
            }
            _ = summary.tick() => {
                let mirror = mirror.read();
                for (index, record) in mirror.records() {
                    info!(
                        index,
                        name = %record.name,
                        total = record.total,
                        plus = record.plus,
                        minus = record.minus,
                        pri = ?record.status.pri,
                        sec = ?record.status.sec,
                    );
                }
            }
        }
    }

    info!("Shutting down...");
    connection.shutdown();
    Ok(())
}
