// src/engine/core.rs

//! Pure core orchestrator state machine.
//!
//! This module contains a synchronous, deterministic state machine that
//! consumes [`OrchestratorEvent`]s and produces:
//! - an updated core state
//! - a list of [`CoreCommand`]s describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Orchestrator`) is responsible for:
//! - waiting on rebuild signals, compile results and process exits
//! - spawning the compiler and replacing the program
//! - handling shutdown
//!
//! The core is intended to be unit tested without any Tokio, channels,
//! filesystem, or processes.

use std::time::Instant;

use tracing::debug;

use crate::engine::commands::{CoreCommand, CoreStep};
use crate::engine::{BuildAttempt, BuildOutcome, BuildSeq, OrchestratorEvent, OrchestratorState};
use crate::types::SignalWhileBuilding;

/// Pure core orchestrator state.
///
/// Invariants:
/// - at most one attempt is in flight;
/// - at most one follow-up build is pending, however many signals arrived;
/// - a finished attempt whose `seq` is not the in-flight one is ignored.
#[derive(Debug)]
pub struct CoreOrchestrator {
    behaviour: SignalWhileBuilding,
    state: OrchestratorState,
    /// State to report once the in-flight attempt resolves without changing
    /// anything (cancelled).
    settled: OrchestratorState,
    next_seq: BuildSeq,
    in_flight: Option<BuildAttempt>,
    cancelling: bool,
    rebuild_pending: bool,
    running: Option<BuildSeq>,
    stopping: bool,
}

impl CoreOrchestrator {
    pub fn new(behaviour: SignalWhileBuilding) -> Self {
        Self {
            behaviour,
            state: OrchestratorState::Idle,
            settled: OrchestratorState::Idle,
            next_seq: 1,
            in_flight: None,
            cancelling: false,
            rebuild_pending: false,
            running: None,
            stopping: false,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn in_flight(&self) -> Option<BuildAttempt> {
        self.in_flight
    }

    /// Build whose program is believed to be running.
    pub fn running(&self) -> Option<BuildSeq> {
        self.running
    }

    pub fn rebuild_pending(&self) -> bool {
        self.rebuild_pending
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// Handle a single event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: OrchestratorEvent) -> CoreStep {
        match event {
            OrchestratorEvent::RebuildRequested => self.on_rebuild_requested(),
            OrchestratorEvent::BuildFinished { seq, outcome } => self.on_build_finished(seq, outcome),
            OrchestratorEvent::ReplacementFailed { seq, still_running } => {
                self.on_replacement_failed(seq, still_running)
            }
            OrchestratorEvent::ProcessExited { seq, code } => self.on_process_exited(seq, code),
            OrchestratorEvent::ShutdownRequested => self.on_shutdown(),
        }
    }

    fn on_rebuild_requested(&mut self) -> CoreStep {
        if self.stopping {
            return CoreStep::keep(Vec::new());
        }

        let Some(attempt) = self.in_flight else {
            return CoreStep::keep(vec![self.start_attempt()]);
        };

        self.rebuild_pending = true;
        let mut commands = Vec::new();
        if self.behaviour == SignalWhileBuilding::Restart && !self.cancelling {
            debug!(seq = attempt.seq, "rebuild requested while building; cancelling attempt");
            self.cancelling = true;
            commands.push(CoreCommand::CancelBuild(attempt));
        } else {
            debug!(seq = attempt.seq, "rebuild requested while building; queued");
        }
        CoreStep::keep(commands)
    }

    fn on_build_finished(&mut self, seq: BuildSeq, outcome: BuildOutcome) -> CoreStep {
        let attempt = match self.in_flight {
            Some(attempt) if attempt.seq == seq => attempt,
            _ => {
                debug!(seq, "ignoring result of stale build attempt");
                return CoreStep::keep(Vec::new());
            }
        };
        self.in_flight = None;
        self.cancelling = false;

        if self.stopping {
            self.state = self.settled;
            return CoreStep {
                commands: Vec::new(),
                keep_running: false,
            };
        }

        let mut commands = Vec::new();
        match outcome {
            BuildOutcome::Success => {
                self.state = OrchestratorState::Running;
                self.running = Some(seq);
                commands.push(CoreCommand::ReplaceProcess(attempt));
            }
            BuildOutcome::Failed { code, stderr } => {
                self.state = OrchestratorState::BuildFailed;
                commands.push(CoreCommand::ReportFailure {
                    attempt,
                    code,
                    stderr,
                });
            }
            BuildOutcome::Cancelled => {
                self.state = self.settled;
                commands.push(CoreCommand::ReportCancelled(attempt));
            }
        }

        if self.rebuild_pending {
            self.rebuild_pending = false;
            commands.push(self.start_attempt());
        }

        CoreStep::keep(commands)
    }

    fn on_replacement_failed(&mut self, seq: BuildSeq, still_running: Option<BuildSeq>) -> CoreStep {
        debug!(seq, ?still_running, "program replacement failed");
        self.running = still_running;
        let settled = if still_running.is_some() {
            OrchestratorState::Running
        } else {
            OrchestratorState::BuildFailed
        };
        self.set_settled(settled);
        CoreStep::keep(Vec::new())
    }

    fn on_process_exited(&mut self, seq: BuildSeq, code: Option<i32>) -> CoreStep {
        if self.running != Some(seq) {
            return CoreStep::keep(Vec::new());
        }
        self.running = None;

        let current = if self.in_flight.is_some() {
            self.settled
        } else {
            self.state
        };
        if current == OrchestratorState::Running {
            self.set_settled(OrchestratorState::Idle);
        }
        CoreStep::keep(vec![CoreCommand::ReportExit { seq, code }])
    }

    fn on_shutdown(&mut self) -> CoreStep {
        self.stopping = true;
        self.rebuild_pending = false;

        let mut commands = Vec::new();
        if let Some(attempt) = self.in_flight {
            commands.push(CoreCommand::CancelBuild(attempt));
        }
        if self.running.take().is_some() {
            commands.push(CoreCommand::StopProcess);
        }
        CoreStep {
            commands,
            keep_running: false,
        }
    }

    fn start_attempt(&mut self) -> CoreCommand {
        let attempt = BuildAttempt {
            seq: self.next_seq,
            started_at: Instant::now(),
        };
        self.next_seq += 1;

        if self.state != OrchestratorState::Building {
            self.settled = self.state;
        }
        self.state = OrchestratorState::Building;
        self.in_flight = Some(attempt);
        self.cancelling = false;

        CoreCommand::StartBuild(attempt)
    }

    /// Update the resting state, deferring to the in-flight attempt if any.
    fn set_settled(&mut self, state: OrchestratorState) {
        if self.in_flight.is_some() {
            self.settled = state;
        } else {
            self.state = state;
        }
    }
}
