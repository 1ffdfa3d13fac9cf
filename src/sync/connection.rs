//! Connection Manager
//!
//! Owns the single persistent push-channel connection, its lifecycle state,
//! and the bounded automatic-reconnect policy. Channel error and channel
//! close collapse into one "terminated" path so a failure can never schedule
//! two retry timers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::sync::messages::PushMessage;
use crate::sync::mirror::RefereeMirror;

/// Lifecycle state of the push channel, broadcast to the UI surface as the
/// connectivity indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Source of push-channel sessions.
///
/// A session is a stream of text frames; the stream ending or yielding an
/// error both mean the channel terminated.
#[async_trait]
pub trait ChannelSource: Send + Sync + 'static {
    async fn open(&self) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>>;
}

/// WebSocket channel source at a fixed well-known address
pub struct WsSource {
    url: String,
}

impl WsSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl ChannelSource for WsSource {
    async fn open(&self) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>> {
        let (ws, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        let frames = ws
            .filter_map(|frame| async move {
                match frame {
                    Ok(Message::Text(text)) => Some(Ok(text)),
                    // Pings are answered by tungstenite; other frames carry
                    // nothing for us
                    Ok(_) => None,
                    Err(e) => Some(Err(e.into())),
                }
            })
            .boxed();
        Ok(frames)
    }
}

/// Push-channel lifecycle owner.
///
/// One instance exists per client process; `connect` is idempotent while a
/// session task is live, and teardown goes through the cancellation token.
pub struct ConnectionManager {
    source: Arc<dyn ChannelSource>,
    mirror: Arc<RwLock<RefereeMirror>>,
    reconnect_delay: Duration,
    state_tx: watch::Sender<ConnectionState>,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown: CancellationToken,
    live: AtomicBool,
}

impl ConnectionManager {
    pub fn new(
        source: Arc<dyn ChannelSource>,
        mirror: Arc<RwLock<RefereeMirror>>,
        reconnect_delay: Duration,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            source,
            mirror,
            reconnect_delay,
            state_tx,
            state_rx,
            shutdown: CancellationToken::new(),
            live: AtomicBool::new(false),
        }
    }

    /// Watch the connectivity indicator
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Start the connection task. A no-op returning `false` while a session
    /// task already exists, so duplicate connect requests cannot open
    /// concurrent channels.
    pub fn connect(self: &Arc<Self>) -> bool {
        if self.live.swap(true, Ordering::SeqCst) {
            debug!("push channel already live, ignoring connect");
            return false;
        }
        let manager = self.clone();
        tokio::spawn(async move {
            manager.run().await;
            manager.live.store(false, Ordering::SeqCst);
        });
        true
    }

    /// Cancel the session and any pending reconnect timer
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn run(&self) {
        loop {
            let _ = self.state_tx.send(ConnectionState::Connecting);

            let opened = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                opened = self.source.open() => opened,
            };

            match opened {
                Ok(mut frames) => {
                    let _ = self.state_tx.send(ConnectionState::Connected);
                    info!("push channel connected");
                    self.read_until_terminated(&mut frames).await;
                    if self.shutdown.is_cancelled() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "push channel connect failed");
                }
            }

            let _ = self.state_tx.send(ConnectionState::Disconnected);

            // The single reconnect timer. Cancellation wins over the delay,
            // so a superseded timer can never fire during teardown.
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {
                    info!("reconnecting push channel");
                }
            }
        }
        let _ = self.state_tx.send(ConnectionState::Disconnected);
    }

    /// Pump frames until the channel terminates. The first error frame ends
    /// the session just like a clean close; the stream is never polled again
    /// afterwards, which is what keeps error and close from double-scheduling
    /// a retry.
    async fn read_until_terminated(&self, frames: &mut BoxStream<'static, anyhow::Result<String>>) {
        loop {
            let item = tokio::select! {
                _ = self.shutdown.cancelled() => return,
                item = frames.next() => item,
            };
            match item {
                Some(Ok(text)) => self.handle_frame(&text),
                Some(Err(e)) => {
                    warn!(error = %e, "push channel terminated with error");
                    return;
                }
                None => {
                    info!("push channel closed");
                    return;
                }
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        match serde_json::from_str::<PushMessage>(text) {
            Ok(PushMessage::ScoreUpdate(payload)) | Ok(PushMessage::StatusUpdate(payload)) => {
                debug!(index = payload.index, total = payload.score.total, "push update");
                self.mirror.write().merge(&payload);
            }
            Ok(PushMessage::Unknown) => {
                debug!("ignoring unrecognized push message type");
            }
            Err(e) => {
                // Malformed frame: discard, connection stays open
                warn!(error = %e, "discarding malformed push message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    /// Channel source that replays scripted sessions and then stays pending
    struct StubSource {
        opens: Arc<AtomicUsize>,
        sessions: Mutex<VecDeque<Vec<anyhow::Result<String>>>>,
    }

    impl StubSource {
        fn new(sessions: Vec<Vec<anyhow::Result<String>>>) -> Self {
            Self {
                opens: Arc::new(AtomicUsize::new(0)),
                sessions: Mutex::new(sessions.into()),
            }
        }
    }

    #[async_trait]
    impl ChannelSource for StubSource {
        async fn open(&self) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            match self.sessions.lock().pop_front() {
                // Scripted frames, then the channel stays open forever
                Some(frames) => Ok(stream::iter(frames).chain(stream::pending()).boxed()),
                None => Ok(stream::pending().boxed()),
            }
        }
    }

    /// Like `StubSource`, but scripted sessions end after their frames
    struct ClosingSource {
        opens: Arc<AtomicUsize>,
        sessions: Mutex<VecDeque<Vec<anyhow::Result<String>>>>,
    }

    impl ClosingSource {
        fn new(sessions: Vec<Vec<anyhow::Result<String>>>) -> Self {
            Self {
                opens: Arc::new(AtomicUsize::new(0)),
                sessions: Mutex::new(sessions.into()),
            }
        }
    }

    #[async_trait]
    impl ChannelSource for ClosingSource {
        async fn open(&self) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            match self.sessions.lock().pop_front() {
                Some(frames) => Ok(stream::iter(frames).boxed()),
                None => Ok(stream::pending().boxed()),
            }
        }
    }

    fn manager(source: Arc<dyn ChannelSource>) -> Arc<ConnectionManager> {
        Arc::new(ConnectionManager::new(
            source,
            Arc::new(RwLock::new(RefereeMirror::new())),
            Duration::from_secs(3),
        ))
    }

    fn score_frame(index: u32, total: i32) -> String {
        format!(
            r#"{{"type":"score_update","payload":{{"index":{},"score":{{"total":{},"plus":{},"minus":0}},"status":{{"pri":"connected","sec":"n/a"}}}}}}"#,
            index, total, total
        )
    }

    #[tokio::test]
    async fn test_connect_guard_rejects_duplicate_sessions() {
        let mgr = manager(Arc::new(StubSource::new(vec![])));
        assert!(mgr.connect());
        assert!(!mgr.connect());
        mgr.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_then_close_schedules_exactly_one_reconnect() {
        // First session dies with an error (which on a real socket is also
        // followed by the stream ending); the replacement session stays up.
        let source = Arc::new(ClosingSource::new(vec![vec![Err(anyhow::anyhow!(
            "connection reset"
        ))]]));
        let opens = source.opens.clone();
        let mgr = manager(source);
        mgr.connect();

        // Well past several reconnect windows
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(opens.load(Ordering::SeqCst), 2);
        mgr.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_waits_full_delay() {
        let source = Arc::new(ClosingSource::new(vec![vec![]]));
        let opens = source.opens.clone();
        let mgr = manager(source);
        mgr.connect();

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(opens.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(opens.load(Ordering::SeqCst), 2);
        mgr.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_reconnect() {
        let source = Arc::new(ClosingSource::new(vec![vec![]]));
        let opens = source.opens.clone();
        let mgr = manager(source);
        mgr.connect();

        // Let the first session end, then cancel while the timer is pending
        tokio::time::sleep(Duration::from_millis(500)).await;
        mgr.shutdown();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(*mgr.state().borrow(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_merge_into_mirror() {
        let source = Arc::new(StubSource::new(vec![vec![
            Ok(score_frame(1, 3)),
            Ok("garbled {".to_string()),
            Ok(r#"{"type":"heartbeat","payload":{}}"#.to_string()),
            Ok(score_frame(1, 4)),
        ]]));
        let mgr = manager(source);
        let mirror = mgr.mirror.clone();
        mgr.connect();

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Malformed and unknown frames were discarded without dropping the
        // connection; the later update still landed
        assert_eq!(*mgr.state().borrow(), ConnectionState::Connected);
        assert_eq!(mirror.read().get(1).unwrap().total, 4);
        mgr.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_transitions_on_connect_and_close() {
        let source = Arc::new(ClosingSource::new(vec![vec![Ok(score_frame(1, 1))]]));
        let mgr = manager(source);
        mgr.connect();

        // First session replays its frame and closes immediately, so the
        // retry timer is pending and the indicator shows Disconnected
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*mgr.state().borrow(), ConnectionState::Disconnected);

        // Retry fires at 3s; the replacement session stays up
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(*mgr.state().borrow(), ConnectionState::Connected);
        mgr.shutdown();
    }
}
