// src/exec/compiler.rs

//! Compiler subprocess backend.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::BuildOutcome;
use crate::exec::CompileInvocation;

/// Boxed future resolving to the outcome of one compile.
pub type BuildFuture = Pin<Box<dyn Future<Output = BuildOutcome> + Send + 'static>>;

/// Trait abstracting how a build is executed.
///
/// Production code uses [`ToolchainCompiler`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait CompilerBackend: Send + Sync {
    /// Run one compile.
    ///
    /// The returned future must resolve to [`BuildOutcome::Cancelled`] soon
    /// after `cancel` fires, and must not leave a compiler process behind.
    fn compile(&self, invocation: CompileInvocation, cancel: CancellationToken) -> BuildFuture;
}

/// Runs the real toolchain with `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ToolchainCompiler;

impl CompilerBackend for ToolchainCompiler {
    fn compile(&self, invocation: CompileInvocation, cancel: CancellationToken) -> BuildFuture {
        Box::pin(run_compiler(invocation, cancel))
    }
}

/// Run the compiler, capturing its output.
///
/// Spawn and wait errors are turned into a failed outcome whose `stderr`
/// carries the error message.
pub async fn run_compiler(invocation: CompileInvocation, cancel: CancellationToken) -> BuildOutcome {
    match run_compiler_inner(&invocation, &cancel).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(program = %invocation.program, error = %err, "compiler execution error");
            BuildOutcome::Failed {
                code: None,
                stderr: format!("{err:#}"),
            }
        }
    }
}

async fn run_compiler_inner(
    invocation: &CompileInvocation,
    cancel: &CancellationToken,
) -> Result<BuildOutcome> {
    info!(
        program = %invocation.program,
        args = ?invocation.args,
        cwd = ?invocation.cwd,
        "starting compiler"
    );

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .current_dir(&invocation.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning compiler `{}`", invocation.program))?;

    // Drain both pipes concurrently so a chatty compiler can't block on a
    // full buffer.
    let stdout_task = tokio::spawn(read_all(child.stdout.take()));
    let stderr_task = tokio::spawn(read_all(child.stderr.take()));

    tokio::select! {
        status_res = child.wait() => {
            let status = status_res.context("waiting for compiler process")?;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();

            for line in stdout.lines().chain(stderr.lines()) {
                debug!("compiler: {}", line);
            }

            info!(
                exit_code = ?status.code(),
                success = status.success(),
                "compiler exited"
            );

            if status.success() {
                Ok(BuildOutcome::Success)
            } else {
                let captured = if stderr.trim().is_empty() { stdout } else { stderr };
                Ok(BuildOutcome::Failed {
                    code: status.code(),
                    stderr: captured,
                })
            }
        }

        _ = cancel.cancelled() => {
            info!("build cancelled; killing compiler");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill compiler on cancellation");
            }
            stdout_task.abort();
            stderr_task.abort();
            Ok(BuildOutcome::Cancelled)
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        if let Err(e) = reader.read_to_end(&mut buf).await {
            debug!(error = %e, "error reading compiler output");
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
