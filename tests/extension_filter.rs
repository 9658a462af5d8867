// tests/extension_filter.rs

use std::path::{Path, PathBuf};

use hotbuild::events::{log_channel, LogKind};
use hotbuild::watch::{ChangeFilter, EventForwarder, ExtensionFilter};
use hotbuild_test_utils::drain_events;
use notify::event::{AccessKind, CreateKind, ModifyKind};
use notify::{Event, EventKind};
use tokio::sync::mpsc;

#[test]
fn normalises_comma_separated_list() {
    let filter = ExtensionFilter::parse(" go, .tpl ,, html");
    assert_eq!(filter.extensions(), [".go", ".tpl", ".html"]);
}

#[test]
fn empty_list_watches_nothing() {
    let filter = ExtensionFilter::parse("");
    assert!(filter.is_empty());
    assert!(!filter.is_wildcard());
    assert!(!filter.matches(Path::new("/src/main.go")));

    assert!(ExtensionFilter::parse(" , ,").is_empty());
}

#[test]
fn wildcard_matches_everything() {
    let filter = ExtensionFilter::parse("*");
    assert!(filter.is_wildcard());
    assert!(filter.matches(Path::new("/src/Makefile")));
    assert!(filter.matches(Path::new("/src/main.go")));
}

#[test]
fn matches_by_extension() {
    let filter = ExtensionFilter::parse("go,tpl");
    assert!(filter.matches(Path::new("/src/main.go")));
    assert!(filter.matches(Path::new("/src/views/index.tpl")));
    assert!(!filter.matches(Path::new("/src/readme.md")));
    assert!(!filter.matches(Path::new("/src/go")));
    assert!(!filter.matches(Path::new("/src/main.gox")));
}

#[test]
fn display_round_trips_through_parse() {
    let filter = ExtensionFilter::parse("go, .tpl");
    assert_eq!(filter.to_string(), ".go,.tpl");
    assert_eq!(ExtensionFilter::parse(&filter.to_string()), filter);
}

fn event(kind: EventKind, paths: &[&str]) -> Event {
    let mut event = Event::new(kind);
    for path in paths {
        event = event.add_path(PathBuf::from(path));
    }
    event
}

#[test]
fn change_filter_drops_access_events() {
    let filter = ChangeFilter::new(ExtensionFilter::parse("go"), Vec::new());
    let access = event(EventKind::Access(AccessKind::Any), &["/p/main.go"]);
    assert!(filter.accepted_paths(&access).is_empty());
}

#[test]
fn change_filter_keeps_only_matching_paths() {
    let filter = ChangeFilter::new(ExtensionFilter::parse("go"), Vec::new());
    let modify = event(
        EventKind::Modify(ModifyKind::Any),
        &["/p/main.go", "/p/readme.md", "/p/util.go"],
    );
    assert_eq!(
        filter.accepted_paths(&modify),
        vec![PathBuf::from("/p/main.go"), PathBuf::from("/p/util.go")]
    );
}

#[test]
fn change_filter_ignores_output_binary() {
    let output = PathBuf::from("/p/app");
    let filter = ChangeFilter::new(ExtensionFilter::parse("*"), vec![output.clone()]);
    let create = event(EventKind::Create(CreateKind::File), &["/p/app", "/p/main.go"]);

    assert_eq!(filter.accepted_paths(&create), vec![PathBuf::from("/p/main.go")]);
    assert!(!filter.accepts(&output));
}

#[test]
fn forwarder_sends_accepted_paths() {
    let (logs, mut log_rx) = log_channel();
    let (changes, mut change_rx) = mpsc::unbounded_channel();
    let forwarder = EventForwarder::new(
        ChangeFilter::new(ExtensionFilter::parse("go"), Vec::new()),
        changes,
        logs,
    );

    forwarder.forward(Ok(event(
        EventKind::Modify(ModifyKind::Any),
        &["/p/main.go", "/p/readme.md"],
    )));

    assert_eq!(change_rx.try_recv().unwrap(), PathBuf::from("/p/main.go"));
    assert!(change_rx.try_recv().is_err());
    assert!(drain_events(&mut log_rx).is_empty());
}

#[test]
fn forwarder_reports_watch_errors_on_the_event_log() {
    let (logs, mut log_rx) = log_channel();
    let (changes, mut change_rx) = mpsc::unbounded_channel();
    let forwarder = EventForwarder::new(
        ChangeFilter::new(ExtensionFilter::parse("go"), Vec::new()),
        changes,
        logs,
    );

    forwarder.forward(Err(notify::Error::generic("inotify queue overflow")));

    let events = drain_events(&mut log_rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, LogKind::Error);
    assert!(events[0].message.contains("inotify queue overflow"));
    assert!(change_rx.try_recv().is_err());
}
