// src/report.rs

//! Console presentation of the event log.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::LogEvent;

/// Print every event to stdout until all sinks have been dropped.
///
/// Diagnostics from `tracing` go to stderr, so stdout carries only the
/// user-facing build/run status (and whatever the child program prints).
pub fn spawn_console_reporter(mut rx: mpsc::UnboundedReceiver<LogEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", format_event(&event));
        }
    })
}

/// `HH:MM:SS [KIND] message`
pub fn format_event(event: &LogEvent) -> String {
    format!(
        "{} [{}] {}",
        event.timestamp.format("%H:%M:%S"),
        event.kind,
        event.message.trim_end()
    )
}
