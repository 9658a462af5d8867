// src/engine/mod.rs

//! Build orchestration engine for hotbuild.
//!
//! This module ties together:
//! - rebuild requests coming from the watcher (or the initial build)
//! - compile attempts, at most one at a time
//! - the running program, replaced after every successful build
//! - shutdown
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::time::{Duration, Instant};

use crate::config::settings::{DEFAULT_DEBOUNCE_MS, DEFAULT_GRACE_PERIOD_MS};
use crate::types::SignalWhileBuilding;

/// Monotonic build attempt number, starting at 1.
pub type BuildSeq = u64;

/// Lifecycle state of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// Nothing built yet, or the last program exited on its own.
    Idle,
    /// A compile is in flight.
    Building,
    /// The program from the last successful build is running.
    Running,
    /// The last completed build failed.
    BuildFailed,
}

/// One compile attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildAttempt {
    pub seq: BuildSeq,
    pub started_at: Instant,
}

/// Result of one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    /// The compiler exited non-zero or could not be run.
    Failed { code: Option<i32>, stderr: String },
    /// The attempt was superseded or the orchestrator is shutting down.
    Cancelled,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Quiet period closing a burst of file changes.
    pub debounce: Duration,
    /// How long a stopped program may take before it is killed.
    pub grace_period: Duration,
    pub while_building: SignalWhileBuilding,
    /// Build once at startup without waiting for a change.
    pub initial_build: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            grace_period: Duration::from_millis(DEFAULT_GRACE_PERIOD_MS),
            while_building: SignalWhileBuilding::default(),
            initial_build: true,
        }
    }
}

/// Events flowing into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorEvent {
    /// A (coalesced) rebuild signal was received.
    RebuildRequested,
    /// A compile attempt finished.
    BuildFinished { seq: BuildSeq, outcome: BuildOutcome },
    /// The program from build `seq` could not be put in place.
    ///
    /// `still_running` names the build whose program is still alive, if any.
    ReplacementFailed {
        seq: BuildSeq,
        still_running: Option<BuildSeq>,
    },
    /// The program from build `seq` exited on its own.
    ProcessExited { seq: BuildSeq, code: Option<i32> },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod commands;
pub mod core;
pub mod runtime;

pub use commands::{CoreCommand, CoreStep};
pub use core::CoreOrchestrator;
pub use runtime::{Orchestrator, RunningProcess};
