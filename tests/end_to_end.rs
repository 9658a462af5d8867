// tests/end_to_end.rs

use std::fs;
use std::time::Duration;

use hotbuild::engine::RuntimeOptions;
use hotbuild::events::{log_channel, LogEvent, LogKind};
use hotbuild::serve_with;
use hotbuild::types::SignalWhileBuilding;
use hotbuild_test_utils::builders::{fast_runtime, BuildOptionsBuilder};
use hotbuild_test_utils::fake_compiler::FakeCompiler;
use hotbuild_test_utils::fake_process::FakeProcesses;
use hotbuild_test_utils::{drain_events, init_tracing, with_timeout};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

async fn wait_for(
    rx: &mut mpsc::UnboundedReceiver<LogEvent>,
    seen: &mut Vec<LogEvent>,
    mut pred: impl FnMut(&LogEvent) -> bool,
) {
    with_timeout(async {
        loop {
            let event = rx.recv().await.expect("log channel open");
            let hit = pred(&event);
            seen.push(event);
            if hit {
                return;
            }
        }
    })
    .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn go_change_rebuilds_and_other_files_do_not() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let options = BuildOptionsBuilder::new().dir(dir.path()).exts("go").build();
    let runtime = RuntimeOptions {
        debounce: Duration::from_millis(150),
        ..fast_runtime(SignalWhileBuilding::Restart)
    };

    let compiler = FakeCompiler::new(Duration::from_millis(20));
    let processes = FakeProcesses::new();
    let (logs, mut rx) = log_channel();
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(serve_with(
        logs,
        options,
        runtime,
        shutdown.clone(),
        compiler.clone(),
        processes.clone(),
    ));

    let mut seen = Vec::new();
    wait_for(&mut rx, &mut seen, |e| e.message.starts_with("watching 1 directory")).await;

    fs::write(dir.path().join("main.go"), "package main\n\nfunc main() {}\n").unwrap();
    wait_for(&mut rx, &mut seen, |e| e.kind == LogKind::Success).await;

    assert_eq!(processes.starts(), 1);
    assert_eq!(compiler.started(), 1);

    fs::write(dir.path().join("readme.md"), "# app\n").unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    seen.extend(drain_events(&mut rx));

    assert_eq!(compiler.started(), 1);
    assert_eq!(processes.starts(), 1);
    assert_eq!(seen.iter().filter(|e| e.kind == LogKind::Success).count(), 1);

    shutdown.cancel();
    let result = with_timeout(task).await.unwrap();
    assert!(result.is_ok());
    assert!(processes.alive().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn initial_build_runs_without_any_change() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let options = BuildOptionsBuilder::new().dir(dir.path()).build();
    let runtime = RuntimeOptions {
        initial_build: true,
        ..fast_runtime(SignalWhileBuilding::Restart)
    };

    let compiler = FakeCompiler::new(Duration::from_millis(10));
    let processes = FakeProcesses::new();
    let (logs, mut rx) = log_channel();
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(serve_with(
        logs,
        options,
        runtime,
        shutdown.clone(),
        compiler.clone(),
        processes.clone(),
    ));

    let mut seen = Vec::new();
    wait_for(&mut rx, &mut seen, |e| e.kind == LogKind::Success).await;
    assert_eq!(processes.starts(), 1);

    shutdown.cancel();
    assert!(with_timeout(task).await.unwrap().is_ok());
}

#[tokio::test]
async fn empty_extension_list_warns_at_startup() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let options = BuildOptionsBuilder::new().dir(dir.path()).exts("").build();
    let (logs, mut rx) = log_channel();
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(serve_with(
        logs,
        options,
        fast_runtime(SignalWhileBuilding::Restart),
        shutdown.clone(),
        FakeCompiler::new(Duration::from_millis(10)),
        FakeProcesses::new(),
    ));

    let mut seen = Vec::new();
    wait_for(&mut rx, &mut seen, |e| e.message.starts_with("watching 1 directory")).await;
    assert!(seen
        .iter()
        .any(|e| e.kind == LogKind::Warning && e.message.contains("no file extensions")));

    shutdown.cancel();
    assert!(with_timeout(task).await.unwrap().is_ok());
}

#[tokio::test]
async fn missing_directory_fails_before_watching() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let options = BuildOptionsBuilder::new()
        .dir(dir.path().join("missing"))
        .build();
    let (logs, _rx) = log_channel();

    let result = serve_with(
        logs,
        options,
        fast_runtime(SignalWhileBuilding::Restart),
        CancellationToken::new(),
        FakeCompiler::new(Duration::from_millis(10)),
        FakeProcesses::new(),
    )
    .await;

    assert!(matches!(
        result,
        Err(hotbuild::errors::HotbuildError::Filesystem(_))
    ));
}
