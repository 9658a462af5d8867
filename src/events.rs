// src/events.rs

//! The event log channel.
//!
//! Every component reports what it is doing by appending [`LogEvent`]s to an
//! unbounded, ordered channel. Producers hold a cloneable [`LogSink`]; a
//! single consumer (the console reporter in production, a `Vec` in tests)
//! drains the receiving end. Producers never read events back.

use std::fmt;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::debug;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Info,
    Warning,
    Success,
    Error,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogKind::Info => "INFO",
            LogKind::Warning => "WARN",
            LogKind::Success => "SUCCESS",
            LogKind::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One entry of the event log.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub kind: LogKind,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl LogEvent {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Local::now(),
        }
    }
}

/// Write-only handle onto the event log channel.
#[derive(Debug, Clone)]
pub struct LogSink {
    tx: mpsc::UnboundedSender<LogEvent>,
}

/// Create a connected sink/receiver pair.
pub fn log_channel() -> (LogSink, mpsc::UnboundedReceiver<LogEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LogSink { tx }, rx)
}

impl LogSink {
    /// Append an event. A closed channel is not an error: it only means
    /// nobody is listening any more.
    pub fn emit(&self, kind: LogKind, message: impl Into<String>) {
        let event = LogEvent::new(kind, message);
        debug!(kind = %event.kind, message = %event.message, "log event");
        let _ = self.tx.send(event);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogKind::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogKind::Warning, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(LogKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogKind::Error, message);
    }
}
