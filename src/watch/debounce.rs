// src/watch/debounce.rs

//! Coalescing of bursts of accepted file changes into rebuild signals.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::watch::signal::{RebuildRequest, RebuildSender};

/// Quiet-period debouncer.
///
/// The first accepted change opens a burst. Every further change that
/// arrives within `window` of the previous one extends the burst. Once
/// `window` passes without a change, the burst closes and exactly one
/// [`RebuildRequest`] is sent.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    signals: RebuildSender,
    bursts: u64,
}

impl Debouncer {
    pub fn new(window: Duration, signals: RebuildSender) -> Self {
        Self {
            window,
            signals,
            bursts: 0,
        }
    }

    /// Consume accepted change paths until the channel closes or `shutdown`
    /// fires. A burst still open at shutdown is dropped.
    pub async fn run(
        mut self,
        mut changes: mpsc::UnboundedReceiver<PathBuf>,
        shutdown: CancellationToken,
    ) {
        loop {
            let first = tokio::select! {
                _ = shutdown.cancelled() => break,
                next = changes.recv() => match next {
                    Some(path) => path,
                    None => break,
                },
            };

            let mut count = 1usize;
            let mut last = first;
            let mut closed = false;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    next = timeout(self.window, changes.recv()) => match next {
                        Ok(Some(path)) => {
                            count += 1;
                            last = path;
                        }
                        Ok(None) => {
                            closed = true;
                            break;
                        }
                        Err(_elapsed) => break,
                    },
                }
            }

            self.emit(count, last);

            if closed {
                break;
            }
        }

        debug!("debouncer finished");
    }

    fn emit(&mut self, changes: usize, last_path: PathBuf) {
        self.bursts += 1;
        info!(
            burst = self.bursts,
            changes,
            path = ?last_path,
            "change burst settled; requesting rebuild"
        );

        let request = RebuildRequest {
            burst: self.bursts,
            changes,
            last_path: Some(last_path),
        };
        if let Some(replaced) = self.signals.send(request) {
            debug!(
                replaced_burst = replaced.burst,
                "orchestrator busy; newer rebuild request replaced pending one"
            );
        }
    }
}
