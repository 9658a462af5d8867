// src/watch/signal.rs

//! Capacity-1, latest-signal-wins channel between the watcher and the
//! orchestrator.
//!
//! Sending never blocks and never queues: an unconsumed request is simply
//! replaced by the newer one. The receiver therefore only ever sees the
//! newest pending intent to rebuild.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

/// "Sources changed, a build should (re)start."
///
/// The fields are diagnostics only; receivers act on the occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildRequest {
    /// Debounce burst counter of the sender (0 for the startup build).
    pub burst: u64,
    /// How many accepted changes were coalesced into this request.
    pub changes: usize,
    /// Last changed path of the burst, if any.
    pub last_path: Option<PathBuf>,
}

impl RebuildRequest {
    /// Request used to trigger the initial build at startup.
    pub fn initial() -> Self {
        Self {
            burst: 0,
            changes: 0,
            last_path: None,
        }
    }
}

#[derive(Debug)]
struct Shared {
    slot: Mutex<Option<RebuildRequest>>,
    notify: Notify,
    senders: AtomicUsize,
}

/// Sending half. Cloneable; the channel closes when the last clone drops.
#[derive(Debug)]
pub struct RebuildSender {
    shared: Arc<Shared>,
}

/// Receiving half, owned by the orchestrator.
#[derive(Debug)]
pub struct RebuildReceiver {
    shared: Arc<Shared>,
}

/// Create a new latest-wins rebuild channel.
pub fn rebuild_channel() -> (RebuildSender, RebuildReceiver) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        notify: Notify::new(),
        senders: AtomicUsize::new(1),
    });
    (
        RebuildSender {
            shared: Arc::clone(&shared),
        },
        RebuildReceiver { shared },
    )
}

impl RebuildSender {
    /// Store `request`, replacing any request not yet received.
    ///
    /// Returns the replaced request, if there was one.
    pub fn send(&self, request: RebuildRequest) -> Option<RebuildRequest> {
        let replaced = {
            let mut slot = self
                .shared
                .slot
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slot.replace(request)
        };
        self.shared.notify.notify_one();
        replaced
    }
}

impl Clone for RebuildSender {
    fn clone(&self) -> Self {
        self.shared.senders.fetch_add(1, Ordering::SeqCst);
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for RebuildSender {
    fn drop(&mut self) {
        if self.shared.senders.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shared.notify.notify_one();
        }
    }
}

impl RebuildReceiver {
    /// Wait for the next request.
    ///
    /// Returns `None` once every sender is gone and the slot is empty.
    /// Cancel safe: a request is only taken out of the slot when this
    /// future completes.
    pub async fn recv(&mut self) -> Option<RebuildRequest> {
        loop {
            if let Some(request) = self.try_recv() {
                return Some(request);
            }
            if self.shared.senders.load(Ordering::SeqCst) == 0 {
                return None;
            }
            self.shared.notify.notified().await;
        }
    }

    /// Take the pending request without waiting.
    pub fn try_recv(&mut self) -> Option<RebuildRequest> {
        self.shared
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}
