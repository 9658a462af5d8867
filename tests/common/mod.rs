#![allow(dead_code)]

pub use hotbuild_test_utils::{drain_events, init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use hotbuild::config::BuildSpec;
use hotbuild::engine::{CoreOrchestrator, Orchestrator};
use hotbuild::errors::Result;
use hotbuild::events::{log_channel, LogEvent, LogKind};
use hotbuild::types::SignalWhileBuilding;
use hotbuild::watch::{rebuild_channel, RebuildRequest, RebuildSender};
use hotbuild_test_utils::builders::BuildOptionsBuilder;
use hotbuild_test_utils::fake_compiler::FakeCompiler;
use hotbuild_test_utils::fake_process::FakeProcesses;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const PROJECT_DIR: &str = "/work/app";

/// An orchestrator running on fakes, plus the handles a test needs to
/// drive and observe it.
pub struct Harness {
    pub compiler: FakeCompiler,
    pub processes: FakeProcesses,
    pub signals: RebuildSender,
    pub shutdown: CancellationToken,
    pub task: JoinHandle<Result<()>>,
    log_rx: mpsc::UnboundedReceiver<LogEvent>,
    pub events: Vec<LogEvent>,
    bursts: u64,
}

impl Harness {
    pub fn spawn(
        behaviour: SignalWhileBuilding,
        compiler: FakeCompiler,
        processes: FakeProcesses,
    ) -> Self {
        let options = BuildOptionsBuilder::new()
            .dir(PROJECT_DIR)
            .app_args("-port=8080 -name \"my app\"")
            .build();
        let spec = Arc::new(BuildSpec::resolve(options).expect("spec resolves"));

        let (signals, signal_rx) = rebuild_channel();
        let (logs, log_rx) = log_channel();
        let shutdown = CancellationToken::new();

        let orchestrator = Orchestrator::new(
            CoreOrchestrator::new(behaviour),
            spec,
            compiler.clone(),
            processes.clone(),
            signal_rx,
            logs,
            shutdown.clone(),
            Duration::from_millis(100),
        );
        let task = tokio::spawn(orchestrator.run());

        Self {
            compiler,
            processes,
            signals,
            shutdown,
            task,
            log_rx,
            events: Vec::new(),
            bursts: 0,
        }
    }

    /// Publish one rebuild request, as the debouncer would.
    pub fn signal(&mut self) {
        self.bursts += 1;
        self.signals.send(RebuildRequest {
            burst: self.bursts,
            changes: 1,
            last_path: None,
        });
    }

    /// Poll until `cond` holds, failing after 5 (possibly virtual) seconds.
    pub async fn wait_until(&mut self, mut cond: impl FnMut(&Harness) -> bool) {
        with_timeout(async {
            loop {
                self.collect_events();
                if cond(self) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
    }

    /// Let the orchestrator run for a while without asserting anything.
    pub async fn settle(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
        self.collect_events();
    }

    pub fn collect_events(&mut self) {
        let new = drain_events(&mut self.log_rx);
        self.events.extend(new);
    }

    pub fn count(&self, kind: LogKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn has_event(&self, kind: LogKind, needle: &str) -> bool {
        self.events
            .iter()
            .any(|e| e.kind == kind && e.message.contains(needle))
    }

    /// Cancel the orchestrator and wait for it to return.
    pub async fn shutdown(mut self) -> (Result<()>, Vec<LogEvent>) {
        self.shutdown.cancel();
        let result = with_timeout(self.task).await.expect("orchestrator task panicked");
        let rest = drain_events(&mut self.log_rx);
        self.events.extend(rest);
        (result, self.events)
    }
}
