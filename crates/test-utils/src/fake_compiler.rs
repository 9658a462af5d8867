use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotbuild::engine::BuildOutcome;
use hotbuild::exec::{BuildFuture, CompileInvocation, CompilerBackend};
use tokio_util::sync::CancellationToken;

/// One scripted compile: how long it takes and how it ends.
#[derive(Debug, Clone)]
pub struct ScriptedBuild {
    pub delay: Duration,
    pub outcome: BuildOutcome,
}

impl ScriptedBuild {
    pub fn success(delay: Duration) -> Self {
        Self {
            delay,
            outcome: BuildOutcome::Success,
        }
    }

    pub fn failure(delay: Duration, stderr: &str) -> Self {
        Self {
            delay,
            outcome: BuildOutcome::Failed {
                code: Some(1),
                stderr: stderr.to_string(),
            },
        }
    }
}

#[derive(Debug)]
struct State {
    script: VecDeque<ScriptedBuild>,
    fallback: ScriptedBuild,
    invocations: Vec<CompileInvocation>,
    finished: usize,
    cancelled: usize,
}

/// A fake compiler that:
/// - records every invocation
/// - plays back scripted outcomes (then a fallback) after a delay
/// - honours cancellation
/// - tracks how many compiles overlapped
#[derive(Debug, Clone)]
pub struct FakeCompiler {
    state: Arc<Mutex<State>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl FakeCompiler {
    /// Every build succeeds after `delay` unless scripted otherwise.
    pub fn new(delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                script: VecDeque::new(),
                fallback: ScriptedBuild::success(delay),
                invocations: Vec::new(),
                finished: 0,
                cancelled: 0,
            })),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue the behaviour of the next not-yet-started compile.
    pub fn push(&self, build: ScriptedBuild) -> &Self {
        self.state.lock().unwrap().script.push_back(build);
        self
    }

    pub fn invocations(&self) -> Vec<CompileInvocation> {
        self.state.lock().unwrap().invocations.clone()
    }

    pub fn started(&self) -> usize {
        self.state.lock().unwrap().invocations.len()
    }

    /// Compiles that ran to their scripted outcome.
    pub fn finished(&self) -> usize {
        self.state.lock().unwrap().finished
    }

    pub fn cancelled(&self) -> usize {
        self.state.lock().unwrap().cancelled
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl CompilerBackend for FakeCompiler {
    fn compile(&self, invocation: CompileInvocation, cancel: CancellationToken) -> BuildFuture {
        let build = {
            let mut state = self.state.lock().unwrap();
            state.invocations.push(invocation);
            let fallback = state.fallback.clone();
            state.script.pop_front().unwrap_or(fallback)
        };

        let state = Arc::clone(&self.state);
        let active = Arc::clone(&self.active);
        let max_active = Arc::clone(&self.max_active);

        Box::pin(async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_active.fetch_max(now, Ordering::SeqCst);

            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    state.lock().unwrap().cancelled += 1;
                    BuildOutcome::Cancelled
                }
                _ = tokio::time::sleep(build.delay) => {
                    state.lock().unwrap().finished += 1;
                    build.outcome
                }
            };

            active.fetch_sub(1, Ordering::SeqCst);
            outcome
        })
    }
}
