// tests/path_expansion.rs

use std::fs;
use std::path::PathBuf;

use hotbuild::errors::HotbuildError;
use hotbuild::fs::mock::MockFileSystem;
use hotbuild::fs::RealFileSystem;
use hotbuild::watch::expand_watch_paths;
use tempfile::TempDir;

fn p(path: &str) -> PathBuf {
    PathBuf::from(path)
}

fn project() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go");
    fs.add_file("/proj/handlers/user.go");
    fs.add_dir("/proj/handlers/internal");
    fs.add_dir("/proj/.git/objects/ab");
    fs.add_dir("/proj/web/.cache/tmp");
    fs.add_dir("/proj/assets");
    fs.add_dir_link("/proj/vendor-link");
    fs
}

#[test]
fn non_recursive_returns_roots_unchanged() {
    let fs = project();
    let roots = vec![p("/proj"), p("/proj/assets")];

    let dirs = expand_watch_paths(&fs, &roots, false).unwrap();

    assert_eq!(dirs, roots);
}

#[test]
fn non_recursive_missing_root_is_a_filesystem_error() {
    let fs = project();
    let roots = vec![p("/proj"), p("/does/not/exist")];

    let err = expand_watch_paths(&fs, &roots, false).unwrap_err();

    assert!(matches!(err, HotbuildError::Filesystem(ref msg) if msg.contains("/does/not/exist")));
}

#[test]
fn recursive_walks_depth_first_and_skips_hidden() {
    let fs = project();

    let dirs = expand_watch_paths(&fs, &[p("/proj")], true).unwrap();

    assert_eq!(
        dirs,
        vec![
            p("/proj"),
            p("/proj/assets"),
            p("/proj/handlers"),
            p("/proj/handlers/internal"),
            p("/proj/web"),
        ]
    );
}

#[test]
fn symlinked_directories_are_not_followed() {
    let fs = project();

    let dirs = expand_watch_paths(&fs, &[p("/proj")], true).unwrap();

    assert!(!dirs.contains(&p("/proj/vendor-link")));
}

#[test]
fn hidden_root_is_still_watched() {
    let fs = MockFileSystem::new();
    fs.add_dir("/home/dev/.config/tool/cmd");

    let dirs = expand_watch_paths(&fs, &[p("/home/dev/.config/tool")], true).unwrap();

    assert_eq!(
        dirs,
        vec![p("/home/dev/.config/tool"), p("/home/dev/.config/tool/cmd")]
    );
}

#[test]
fn multiple_roots_are_expanded_in_order() {
    let fs = MockFileSystem::new();
    fs.add_dir("/b/x");
    fs.add_dir("/a/y");

    let dirs = expand_watch_paths(&fs, &[p("/b"), p("/a")], true).unwrap();

    assert_eq!(dirs, vec![p("/b"), p("/b/x"), p("/a"), p("/a/y")]);
}

#[test]
fn missing_root_is_a_filesystem_error() {
    let fs = project();

    let err = expand_watch_paths(&fs, &[p("/nope")], true).unwrap_err();

    assert!(matches!(err, HotbuildError::Filesystem(_)), "got {err:?}");
}

#[test]
fn unreadable_subdirectory_aborts_expansion() {
    let fs = project();
    fs.make_unreadable("/proj/handlers/internal");

    let err = expand_watch_paths(&fs, &[p("/proj")], true).unwrap_err();

    match err {
        HotbuildError::Filesystem(msg) => assert!(msg.contains("Permission denied")),
        other => panic!("expected Filesystem error, got {other:?}"),
    }
}

#[test]
fn real_tree_excludes_git_directory() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    fs::create_dir_all(root.join("cmd/server")).unwrap();
    fs::create_dir_all(root.join(".git/refs/heads")).unwrap();
    fs::write(root.join("main.go"), "package main\n").unwrap();
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();

    let dirs = expand_watch_paths(&RealFileSystem, &[root.clone()], true).unwrap();

    assert_eq!(
        dirs,
        vec![root.clone(), root.join("cmd"), root.join("cmd/server")]
    );
    assert!(dirs.iter().all(|d| !d.starts_with(root.join(".git"))));
}
