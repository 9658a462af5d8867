// src/exec/process.rs

//! Lifecycle of the compiled program.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::errors::{HotbuildError, Result};
use crate::exec::LaunchSpec;

/// Boxed future borrowed from the backend for the duration of one call.
pub type ProcessFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Trait abstracting how the program is started and stopped.
///
/// Production code uses [`ChildProcessBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ProcessBackend: Send {
    type Handle: Send;

    /// Start the program. Must not block.
    fn start(&mut self, launch: &LaunchSpec) -> Result<Self::Handle>;

    /// OS process id, if there is one.
    fn id(&self, handle: &Self::Handle) -> Option<u32>;

    /// Ask the program to stop, escalating to a kill after `grace`.
    ///
    /// Resolves once the program has exited. An error means it may still be
    /// alive.
    fn terminate<'a>(&'a mut self, handle: &'a mut Self::Handle, grace: Duration)
        -> ProcessFuture<'a, ()>;

    /// Wait until the program exits on its own; yields the exit code.
    ///
    /// Must be cancel-safe: it is raced against other events.
    fn wait<'a>(&'a mut self, handle: &'a mut Self::Handle) -> ProcessFuture<'a, Option<i32>>;
}

/// Runs the program as a `tokio::process::Child` sharing our stdio.
#[derive(Debug, Clone, Default)]
pub struct ChildProcessBackend;

impl ProcessBackend for ChildProcessBackend {
    type Handle = Child;

    fn start(&mut self, launch: &LaunchSpec) -> Result<Child> {
        let child = Command::new(&launch.program)
            .args(&launch.args)
            .current_dir(&launch.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                HotbuildError::ProcessLifecycle(format!("cannot start {:?}: {e}", launch.program))
            })?;

        info!(pid = ?child.id(), program = ?launch.program, "program started");
        Ok(child)
    }

    fn id(&self, handle: &Child) -> Option<u32> {
        handle.id()
    }

    fn terminate<'a>(&'a mut self, child: &'a mut Child, grace: Duration) -> ProcessFuture<'a, ()> {
        Box::pin(async move {
            if let Some(status) = child.try_wait()? {
                debug!(?status, "program had already exited");
                return Ok(());
            }

            if let Err(e) = request_stop(child) {
                warn!(error = %e, "graceful stop request failed; will kill");
            }

            match timeout(grace, child.wait()).await {
                Ok(Ok(status)) => {
                    info!(?status, "program stopped");
                    Ok(())
                }
                Ok(Err(e)) => Err(HotbuildError::ProcessLifecycle(format!(
                    "waiting for program to stop: {e}"
                ))),
                Err(_) => {
                    warn!(?grace, "program did not stop within grace period; killing");
                    child.kill().await.map_err(|e| {
                        HotbuildError::ProcessLifecycle(format!("cannot kill program: {e}"))
                    })?;
                    Ok(())
                }
            }
        })
    }

    fn wait<'a>(&'a mut self, child: &'a mut Child) -> ProcessFuture<'a, Option<i32>> {
        Box::pin(async move {
            let status = child.wait().await?;
            Ok(status.code())
        })
    }
}

#[cfg(unix)]
fn request_stop(child: &mut Child) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };
    kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(|e| {
        HotbuildError::ProcessLifecycle(format!("cannot send SIGTERM to {pid}: {e}"))
    })
}

#[cfg(not(unix))]
fn request_stop(child: &mut Child) -> Result<()> {
    child
        .start_kill()
        .map_err(|e| HotbuildError::ProcessLifecycle(format!("cannot stop program: {e}")))
}
