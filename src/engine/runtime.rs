// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::BuildSpec;
use crate::errors::{HotbuildError, Result};
use crate::events::LogSink;
use crate::exec::{CompilerBackend, ProcessBackend};
use crate::watch::{RebuildReceiver, RebuildRequest};

use super::core::CoreOrchestrator;
use super::{BuildAttempt, BuildOutcome, BuildSeq, CoreCommand, OrchestratorEvent};

/// The program started from a successful build.
#[derive(Debug)]
pub struct RunningProcess<H> {
    pub seq: BuildSeq,
    pub handle: H,
}

struct InFlightBuild {
    seq: BuildSeq,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// What woke the event loop up.
enum Wakeup {
    Shutdown,
    BuildDone(BuildSeq, BuildOutcome),
    Exited(BuildSeq, Result<Option<i32>>),
    Rebuild(RebuildRequest),
}

/// Drives [`CoreOrchestrator`] in response to rebuild signals, compile
/// results, program exits and shutdown, and carries out its commands with a
/// [`CompilerBackend`] and a [`ProcessBackend`].
///
/// Program replacement runs inline in the loop, so no new signal, compile
/// result or process is handled until the old program is gone and the new
/// one has started.
pub struct Orchestrator<C: CompilerBackend, P: ProcessBackend> {
    core: CoreOrchestrator,
    spec: Arc<BuildSpec>,
    compiler: C,
    processes: P,
    signals: RebuildReceiver,
    logs: LogSink,
    shutdown: CancellationToken,
    grace_period: Duration,
    running: Option<RunningProcess<P::Handle>>,
    in_flight: Option<InFlightBuild>,
    done_tx: mpsc::UnboundedSender<(BuildSeq, BuildOutcome)>,
    done_rx: mpsc::UnboundedReceiver<(BuildSeq, BuildOutcome)>,
}

impl<C: CompilerBackend, P: ProcessBackend> fmt::Debug for Orchestrator<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("core", &self.core)
            .field("running", &self.running.as_ref().map(|r| r.seq))
            .field("in_flight", &self.in_flight.as_ref().map(|b| b.seq))
            .finish_non_exhaustive()
    }
}

impl<C: CompilerBackend, P: ProcessBackend> Orchestrator<C, P> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        core: CoreOrchestrator,
        spec: Arc<BuildSpec>,
        compiler: C,
        processes: P,
        signals: RebuildReceiver,
        logs: LogSink,
        shutdown: CancellationToken,
        grace_period: Duration,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            core,
            spec,
            compiler,
            processes,
            signals,
            logs,
            shutdown,
            grace_period,
            running: None,
            in_flight: None,
            done_tx,
            done_rx,
        }
    }

    /// Main event loop. Returns once shutdown has been requested and every
    /// child process is gone.
    pub async fn run(mut self) -> Result<()> {
        info!("orchestrator started");

        loop {
            let wakeup = self.next_wakeup().await;
            let event = self.event_from(wakeup);
            debug!(?event, "orchestrator received event");

            if !self.handle(event).await? {
                info!("core requested exit; stopping orchestrator");
                break;
            }
        }

        self.finish().await;
        info!("orchestrator exiting");
        Ok(())
    }

    async fn next_wakeup(&mut self) -> Wakeup {
        tokio::select! {
            biased;

            _ = self.shutdown.cancelled() => Wakeup::Shutdown,

            Some((seq, outcome)) = self.done_rx.recv() => Wakeup::BuildDone(seq, outcome),

            (seq, result) = wait_for_exit(&mut self.processes, &mut self.running) => {
                Wakeup::Exited(seq, result)
            }

            Some(request) = self.signals.recv() => Wakeup::Rebuild(request),
        }
    }

    fn event_from(&mut self, wakeup: Wakeup) -> OrchestratorEvent {
        match wakeup {
            Wakeup::Shutdown => OrchestratorEvent::ShutdownRequested,
            Wakeup::BuildDone(seq, outcome) => {
                if self.in_flight.as_ref().is_some_and(|b| b.seq == seq) {
                    self.in_flight = None;
                }
                OrchestratorEvent::BuildFinished { seq, outcome }
            }
            Wakeup::Exited(seq, result) => {
                self.running = None;
                let code = match result {
                    Ok(code) => code,
                    Err(e) => {
                        warn!(seq, error = %e, "lost track of program; treating it as exited");
                        None
                    }
                };
                OrchestratorEvent::ProcessExited { seq, code }
            }
            Wakeup::Rebuild(request) => {
                debug!(
                    burst = request.burst,
                    changes = request.changes,
                    last_path = ?request.last_path,
                    "rebuild requested"
                );
                OrchestratorEvent::RebuildRequested
            }
        }
    }

    /// Feed one event (and any follow-ups its commands produce) through the
    /// core. Returns whether the loop should keep running.
    async fn handle(&mut self, event: OrchestratorEvent) -> Result<bool> {
        let mut queue = VecDeque::from([event]);
        let mut keep_running = true;

        while let Some(event) = queue.pop_front() {
            let step = self.core.step(event);
            for command in step.commands {
                if let Some(follow_up) = self.execute_command(command).await? {
                    queue.push_back(follow_up);
                }
            }
            keep_running &= step.keep_running;
        }

        Ok(keep_running)
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<Option<OrchestratorEvent>> {
        match command {
            CoreCommand::StartBuild(attempt) => {
                self.start_build(attempt);
                Ok(None)
            }
            CoreCommand::CancelBuild(attempt) => {
                if let Some(build) = self.in_flight.as_ref().filter(|b| b.seq == attempt.seq) {
                    if !self.core.is_stopping() {
                        self.logs.info(format!(
                            "sources changed during build #{}; restarting build",
                            attempt.seq
                        ));
                    }
                    build.cancel.cancel();
                }
                Ok(None)
            }
            CoreCommand::ReplaceProcess(attempt) => Ok(self.replace_process(attempt).await),
            CoreCommand::ReportFailure {
                attempt,
                code,
                stderr,
            } => {
                let status = match code {
                    Some(code) => format!("exit code {code}"),
                    None => "no exit code".to_string(),
                };
                let err = HotbuildError::Build(format!(
                    "build #{} failed ({status}):\n{}",
                    attempt.seq,
                    stderr.trim_end()
                ));
                warn!(seq = attempt.seq, exit_code = ?code, "build failed");
                self.logs.error(err.to_string());
                Ok(None)
            }
            CoreCommand::ReportCancelled(attempt) => {
                debug!(seq = attempt.seq, "build attempt cancelled");
                Ok(None)
            }
            CoreCommand::StopProcess => {
                self.stop_running().await;
                Ok(None)
            }
            CoreCommand::ReportExit { seq, code } => {
                match code {
                    Some(0) => self.logs.info(format!("program from build #{seq} exited")),
                    Some(code) => self
                        .logs
                        .warn(format!("program from build #{seq} exited with code {code}")),
                    None => self
                        .logs
                        .warn(format!("program from build #{seq} was terminated")),
                }
                Ok(None)
            }
        }
    }

    fn start_build(&mut self, attempt: BuildAttempt) {
        let invocation = self.spec.compile_invocation();
        self.logs.info(format!(
            "build #{} started: {}",
            attempt.seq,
            invocation.command_line()
        ));

        let cancel = self.shutdown.child_token();
        let compile = self.compiler.compile(invocation, cancel.clone());
        let done_tx = self.done_tx.clone();
        let seq = attempt.seq;

        let task = tokio::spawn(async move {
            let outcome = compile.await;
            let _ = done_tx.send((seq, outcome));
        });

        self.in_flight = Some(InFlightBuild { seq, cancel, task });
    }

    /// Stop the current program and start the one from `attempt`.
    ///
    /// Returns a follow-up event when the new program could not be put in
    /// place.
    async fn replace_process(&mut self, attempt: BuildAttempt) -> Option<OrchestratorEvent> {
        if let Some(mut old) = self.running.take() {
            self.logs
                .info(format!("stopping program from build #{}", old.seq));
            if let Err(e) = self
                .processes
                .terminate(&mut old.handle, self.grace_period)
                .await
            {
                error!(seq = old.seq, error = %e, "failed to stop program");
                self.logs.error(format!(
                    "could not stop program from build #{}: {e}; not starting build #{}",
                    old.seq, attempt.seq
                ));
                let still_running = Some(old.seq);
                self.running = Some(old);
                return Some(OrchestratorEvent::ReplacementFailed {
                    seq: attempt.seq,
                    still_running,
                });
            }
        }

        if self.shutdown.is_cancelled() {
            info!(seq = attempt.seq, "shutdown requested; not starting program");
            self.logs.info(format!(
                "build #{} not started: shutting down",
                attempt.seq
            ));
            return Some(OrchestratorEvent::ReplacementFailed {
                seq: attempt.seq,
                still_running: None,
            });
        }

        let launch = self.spec.launch_spec();
        match self.processes.start(&launch) {
            Ok(handle) => {
                let pid = self
                    .processes
                    .id(&handle)
                    .map(|pid| pid.to_string())
                    .unwrap_or_else(|| "?".to_string());
                self.logs.success(format!(
                    "build #{} finished in {:.2?}; started {} (pid {pid})",
                    attempt.seq,
                    attempt.started_at.elapsed(),
                    launch.command_line()
                ));
                self.running = Some(RunningProcess {
                    seq: attempt.seq,
                    handle,
                });
                None
            }
            Err(e) => {
                error!(seq = attempt.seq, error = %e, "failed to start program");
                self.logs.error(format!(
                    "build #{} succeeded but the program could not be started: {e}",
                    attempt.seq
                ));
                Some(OrchestratorEvent::ReplacementFailed {
                    seq: attempt.seq,
                    still_running: None,
                })
            }
        }
    }

    async fn stop_running(&mut self) {
        let Some(mut process) = self.running.take() else {
            return;
        };
        self.logs
            .info(format!("stopping program from build #{}", process.seq));
        match self
            .processes
            .terminate(&mut process.handle, self.grace_period)
            .await
        {
            Ok(()) => debug!(seq = process.seq, "program stopped"),
            Err(e) => {
                error!(seq = process.seq, error = %e, "failed to stop program");
                self.logs.error(format!(
                    "could not stop program from build #{}: {e}",
                    process.seq
                ));
            }
        }
    }

    /// Drain the in-flight compile and make sure no program survives.
    async fn finish(&mut self) {
        if let Some(build) = self.in_flight.take() {
            build.cancel.cancel();
            if let Err(e) = build.task.await {
                warn!(seq = build.seq, error = %e, "compile task did not finish cleanly");
            }
            self.logs.info(format!("build #{} aborted", build.seq));
        }
        self.stop_running().await;
        self.logs.info("hot rebuild stopped");
    }
}

async fn wait_for_exit<P: ProcessBackend>(
    processes: &mut P,
    running: &mut Option<RunningProcess<P::Handle>>,
) -> (BuildSeq, Result<Option<i32>>) {
    match running.as_mut() {
        Some(process) => {
            let seq = process.seq;
            (seq, processes.wait(&mut process.handle).await)
        }
        None => std::future::pending().await,
    }
}
