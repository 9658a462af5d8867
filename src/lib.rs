// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod types;
pub mod watch;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{exe_suffix_from_env, load_config, BuildOptions, BuildSpec, Settings};
use crate::engine::{CoreOrchestrator, Orchestrator, RuntimeOptions};
use crate::errors::Result;
use crate::events::{log_channel, LogSink};
use crate::exec::{ChildProcessBackend, CompilerBackend, ProcessBackend, ToolchainCompiler};
use crate::fs::RealFileSystem;
use crate::watch::{expand_watch_paths, rebuild_channel, spawn_watcher, ChangeFilter, RebuildRequest};

/// How long `run` waits for the reporter to flush after shutdown.
const REPORTER_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and merging
/// - the event log and its console reporter
/// - Ctrl-C handling
/// - [`serve`]
pub async fn run(args: CliArgs) -> Result<()> {
    let file = load_config(args.config.as_deref())?;
    let settings = Settings::resolve(&args, file, exe_suffix_from_env())?;
    debug!(?settings, "resolved settings");

    let (logs, log_rx) = log_channel();
    let reporter = report::spawn_console_reporter(log_rx);

    // Ctrl-C → graceful shutdown.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; shutting down");
            shutdown.cancel();
        });
    }

    let result = serve(logs, settings.build, settings.runtime, shutdown).await;

    // `serve` consumed the last sink, so the reporter ends once it has
    // printed everything.
    if tokio::time::timeout(REPORTER_FLUSH_TIMEOUT, reporter).await.is_err() {
        warn!("event reporter did not finish in time");
    }

    result
}

/// Watch the configured directories and keep the program rebuilt and
/// running until `shutdown` is cancelled.
///
/// Fails before anything is watched if the options don't resolve
/// (`Configuration`) or the directory tree can't be walked (`Filesystem`).
/// Build and process failures after that point are reported on `logs` and
/// never end the loop.
pub async fn serve(
    logs: LogSink,
    options: BuildOptions,
    runtime: RuntimeOptions,
    shutdown: CancellationToken,
) -> Result<()> {
    serve_with(
        logs,
        options,
        runtime,
        shutdown,
        ToolchainCompiler,
        ChildProcessBackend,
    )
    .await
}

/// [`serve`] with explicit compiler and process backends.
pub async fn serve_with<C, P>(
    logs: LogSink,
    options: BuildOptions,
    runtime: RuntimeOptions,
    shutdown: CancellationToken,
    compiler: C,
    processes: P,
) -> Result<()>
where
    C: CompilerBackend,
    P: ProcessBackend,
{
    let spec = Arc::new(BuildSpec::resolve(options)?);

    logs.info(format!(
        "passing the following arguments to the program: {:?}",
        spec.app_args()
    ));
    if spec.exts().is_empty() {
        logs.warn("no file extensions configured; no file will be watched");
    } else {
        logs.info(format!("watching files with extensions: {}", spec.exts()));
    }
    logs.info(format!("output binary: {}", spec.output().display()));

    let dirs = expand_watch_paths(&RealFileSystem, spec.roots(), spec.recursive())?;
    debug!(?dirs, "expanded watch directories");

    let (signals, signal_rx) = rebuild_channel();
    if runtime.initial_build {
        signals.send(RebuildRequest::initial());
    }

    let filter = ChangeFilter::new(spec.exts().clone(), vec![spec.output().to_path_buf()]);
    let watcher = spawn_watcher(
        &dirs,
        filter,
        runtime.debounce,
        signals,
        logs.clone(),
        shutdown.clone(),
    )?;
    logs.info(format!(
        "watching {} director{}",
        dirs.len(),
        if dirs.len() == 1 { "y" } else { "ies" }
    ));

    let orchestrator = Orchestrator::new(
        CoreOrchestrator::new(runtime.while_building),
        Arc::clone(&spec),
        compiler,
        processes,
        signal_rx,
        logs,
        shutdown,
        runtime.grace_period,
    );
    let result = orchestrator.run().await;

    watcher.stop().await;
    result
}
