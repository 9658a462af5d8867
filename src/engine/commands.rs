// src/engine/commands.rs

use crate::engine::{BuildAttempt, BuildSeq};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Spawn the compiler for this attempt.
    StartBuild(BuildAttempt),
    /// Ask the in-flight compile to stop. Its `BuildFinished` still arrives.
    CancelBuild(BuildAttempt),
    /// Stop the current program (if any) and start the one from this attempt.
    ReplaceProcess(BuildAttempt),
    /// Tell the user the build failed. The running program is left alone.
    ReportFailure {
        attempt: BuildAttempt,
        code: Option<i32>,
        stderr: String,
    },
    ReportCancelled(BuildAttempt),
    /// Stop the running program without starting another.
    StopProcess,
    /// The program from build `seq` exited by itself.
    ReportExit { seq: BuildSeq, code: Option<i32> },
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn keep(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}
