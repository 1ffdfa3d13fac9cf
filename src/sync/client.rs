//! Sync client command semantics
//!
//! Binds the command gateway to the referee mirror: setup installs records
//! only after backend success, reset zeroes optimistically ahead of the
//! response, teardown clears unconditionally, and forced scans are collapsed
//! into a single in-flight request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::sync::gateway::{CommandError, ControlApi};
use crate::sync::messages::{DeviceInfo, SetupRequest};
use crate::sync::mirror::RefereeMirror;

type ScanFuture = Shared<BoxFuture<'static, Result<Vec<DeviceInfo>, CommandError>>>;

struct ScanFlight {
    id: u64,
    future: ScanFuture,
}

/// User-facing commands against the backend, with optimistic mirror writes
pub struct SyncClient {
    api: Arc<dyn ControlApi>,
    mirror: Arc<RwLock<RefereeMirror>>,
    scan_flight: Arc<Mutex<Option<ScanFlight>>>,
    flight_seq: AtomicU64,
}

impl SyncClient {
    pub fn new(api: Arc<dyn ControlApi>, mirror: Arc<RwLock<RefereeMirror>>) -> Self {
        Self {
            api,
            mirror,
            scan_flight: Arc::new(Mutex::new(None)),
            flight_seq: AtomicU64::new(0),
        }
    }

    /// Shared handle to the referee mirror
    pub fn mirror(&self) -> Arc<RwLock<RefereeMirror>> {
        self.mirror.clone()
    }

    /// Query the device list. `force_refresh` triggers a full backend rescan
    /// (expected to block for several seconds); concurrent forced scans share
    /// one in-flight request. Cached queries always go straight through.
    pub async fn scan(&self, force_refresh: bool) -> Result<Vec<DeviceInfo>, CommandError> {
        if !force_refresh {
            return self.api.scan(false).await;
        }

        let future = {
            let mut slot = self.scan_flight.lock().await;
            if let Some(flight) = slot.as_ref() {
                flight.future.clone()
            } else {
                let api = self.api.clone();
                let id = self.flight_seq.fetch_add(1, Ordering::Relaxed);
                let slot_handle = self.scan_flight.clone();
                // The flight clears its own slot on completion (if the slot
                // still holds it), so a caller dropped mid-flight cannot
                // leave a finished result cached in there.
                let future: ScanFuture = async move {
                    let result = api.scan(true).await;
                    let mut slot = slot_handle.lock().await;
                    if slot.as_ref().map(|flight| flight.id) == Some(id) {
                        *slot = None;
                    }
                    result
                }
                .boxed()
                .shared();
                *slot = Some(ScanFlight {
                    id,
                    future: future.clone(),
                });
                future
            }
        };

        future.await
    }

    /// Configure referees. The mirror is touched only after the backend
    /// accepts the configuration; on failure it is left as it was and the
    /// error surfaces to the caller.
    pub async fn setup(&self, request: SetupRequest) -> Result<(), CommandError> {
        self.api.setup(&request).await?;
        self.mirror.write().install(&request.referees);
        info!(referees = request.referees.len(), "referee setup installed");
        Ok(())
    }

    /// Zero every referee's scores. The zeroing is optimistic: it happens
    /// before the backend response resolves, and a failed request is logged
    /// without rolling it back.
    pub async fn reset_all(&self) {
        self.mirror.write().zero_scores();
        if let Err(e) = self.api.reset().await {
            warn!(error = %e, "reset request failed, local zeroing kept");
        }
    }

    /// End the match. The mirror is cleared whether or not the backend
    /// teardown succeeds; failure is logged, never thrown.
    pub async fn stop_match(&self) {
        if let Err(e) = self.api.teardown().await {
            warn!(error = %e, "teardown request failed");
        }
        self.mirror.write().clear();
        info!("match stopped, mirror cleared");
    }
}
