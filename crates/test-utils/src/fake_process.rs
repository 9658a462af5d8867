use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotbuild::errors::{HotbuildError, Result};
use hotbuild::exec::process::ProcessFuture;
use hotbuild::exec::{LaunchSpec, ProcessBackend};
use tokio::sync::watch;

/// Handle onto a fake program.
#[derive(Debug)]
pub struct FakeHandle {
    pub id: u32,
    exit_rx: watch::Receiver<Option<Option<i32>>>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    alive: BTreeSet<u32>,
    max_alive: usize,
    launches: Vec<LaunchSpec>,
    terminated: Vec<u32>,
    fail_terminate: bool,
    fail_start: bool,
    terminate_delay: Option<Duration>,
    exits: HashMap<u32, watch::Sender<Option<Option<i32>>>>,
}

/// A fake process backend that:
/// - hands out numbered handles instead of spawning anything
/// - tracks which "programs" are alive and the peak number alive at once
/// - can be told to fail starts or terminations, or to stop slowly
/// - lets a test make a program exit on its own
#[derive(Debug, Clone, Default)]
pub struct FakeProcesses {
    state: Arc<Mutex<State>>,
}

impl FakeProcesses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alive(&self) -> Vec<u32> {
        self.state.lock().unwrap().alive.iter().copied().collect()
    }

    pub fn max_alive(&self) -> usize {
        self.state.lock().unwrap().max_alive
    }

    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.state.lock().unwrap().launches.clone()
    }

    pub fn starts(&self) -> usize {
        self.state.lock().unwrap().launches.len()
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.state.lock().unwrap().terminated.clone()
    }

    pub fn set_fail_terminate(&self, fail: bool) {
        self.state.lock().unwrap().fail_terminate = fail;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.state.lock().unwrap().fail_start = fail;
    }

    /// Make every later `terminate` take `delay` before it returns.
    pub fn set_terminate_delay(&self, delay: Duration) {
        self.state.lock().unwrap().terminate_delay = Some(delay);
    }

    /// Make program `id` exit by itself with `code`.
    pub fn exit(&self, id: u32, code: Option<i32>) {
        let mut state = self.state.lock().unwrap();
        state.alive.remove(&id);
        if let Some(tx) = state.exits.get(&id) {
            let _ = tx.send(Some(code));
        }
    }
}

impl ProcessBackend for FakeProcesses {
    type Handle = FakeHandle;

    fn start(&mut self, launch: &LaunchSpec) -> Result<FakeHandle> {
        let mut state = self.state.lock().unwrap();
        if state.fail_start {
            return Err(HotbuildError::ProcessLifecycle(
                "fake start failure".to_string(),
            ));
        }

        state.next_id += 1;
        let id = state.next_id;
        state.alive.insert(id);
        state.max_alive = state.max_alive.max(state.alive.len());
        state.launches.push(launch.clone());

        let (tx, exit_rx) = watch::channel(None);
        state.exits.insert(id, tx);

        Ok(FakeHandle { id, exit_rx })
    }

    fn id(&self, handle: &FakeHandle) -> Option<u32> {
        Some(handle.id)
    }

    fn terminate<'a>(
        &'a mut self,
        handle: &'a mut FakeHandle,
        _grace: Duration,
    ) -> ProcessFuture<'a, ()> {
        let (delay, result) = {
            let mut state = self.state.lock().unwrap();
            let delay = state.terminate_delay;
            let result = if state.fail_terminate {
                Err(HotbuildError::ProcessLifecycle(format!(
                    "fake program {} refused to stop",
                    handle.id
                )))
            } else {
                state.alive.remove(&handle.id);
                state.terminated.push(handle.id);
                Ok(())
            };
            (delay, result)
        };
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }

    fn wait<'a>(&'a mut self, handle: &'a mut FakeHandle) -> ProcessFuture<'a, Option<i32>> {
        Box::pin(async move {
            loop {
                let exited = *handle.exit_rx.borrow_and_update();
                if let Some(code) = exited {
                    return Ok(code);
                }
                if handle.exit_rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        })
    }
}
