// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::errors::Result;
use crate::events::LogSink;
use crate::watch::debounce::Debouncer;
use crate::watch::event_handler::ChangeFilter;
use crate::watch::signal::RebuildSender;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    debouncer: JoinHandle<()>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish_non_exhaustive()
    }
}

impl WatcherHandle {
    /// Stop delivering notifications and wait for the debouncer to exit.
    pub async fn stop(self) {
        let WatcherHandle {
            _inner: watcher,
            debouncer,
        } = self;
        // Dropping the notify watcher closes the change channel, which in
        // turn ends the debouncer loop.
        drop(watcher);
        let _ = debouncer.await;
    }
}

/// Body of the notify callback: filters events into the change channel and
/// reports watch errors on the event log.
pub struct EventForwarder {
    filter: ChangeFilter,
    changes: mpsc::UnboundedSender<PathBuf>,
    logs: LogSink,
}

impl EventForwarder {
    pub fn new(
        filter: ChangeFilter,
        changes: mpsc::UnboundedSender<PathBuf>,
        logs: LogSink,
    ) -> Self {
        Self {
            filter,
            changes,
            logs,
        }
    }

    /// Called synchronously by notify for every event or error.
    pub fn forward(&self, res: notify::Result<Event>) {
        match res {
            Ok(event) => {
                trace!(?event, "received notify event");
                for path in self.filter.accepted_paths(&event) {
                    if self.changes.send(path).is_err() {
                        // Debouncer gone: we are shutting down.
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "file watch error");
                self.logs.error(format!("file watch error: {err}"));
            }
        }
    }
}

/// Spawn a filesystem watcher over the expanded directory set.
///
/// - `dirs` are watched non-recursively; recursion was already applied by
///   [`expand_watch_paths`](crate::watch::paths::expand_watch_paths).
/// - `filter` decides which changed paths are relevant.
/// - Watch errors reported by notify go to `logs` as Error events.
/// - Accepted changes are debounced over `window` and then published on
///   `signals`.
///
/// The notify callback only filters and forwards into an unbounded channel,
/// so notification delivery never waits on the orchestrator.
pub fn spawn_watcher(
    dirs: &[PathBuf],
    filter: ChangeFilter,
    window: Duration,
    signals: RebuildSender,
    logs: LogSink,
    shutdown: CancellationToken,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (change_tx, change_rx) = mpsc::unbounded_channel::<PathBuf>();
    let forwarder = EventForwarder::new(filter, change_tx, logs);

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| forwarder.forward(res),
        Config::default(),
    )?;

    for dir in dirs {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        debug!(path = ?dir, "watching directory");
    }

    info!(dirs = dirs.len(), "file watcher started");

    let debouncer = tokio::spawn(Debouncer::new(window, signals).run(change_rx, shutdown));

    Ok(WatcherHandle {
        _inner: watcher,
        debouncer,
    })
}
