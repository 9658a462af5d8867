// src/watch/paths.rs

//! Expansion of the watched roots into the full directory set.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::{HotbuildError, Result};
use crate::fs::FileSystem;

/// Produce every directory that needs a (non-recursive) watch.
///
/// - `recursive == false`: the roots are returned unchanged once each is
///   confirmed to be a directory.
/// - `recursive == true`: each root and all of its descendant directories,
///   depth-first with siblings in sorted order. A directory whose path
///   relative to its root has a component starting with `.` is skipped
///   together with its subtree. Symlinked directories are not followed.
///
/// Any read failure aborts the whole expansion; no partial set is returned.
pub fn expand_watch_paths(
    fs: &dyn FileSystem,
    roots: &[PathBuf],
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    if let Some(root) = roots.iter().find(|root| !fs.is_dir(root)) {
        return Err(HotbuildError::Filesystem(format!(
            "watch root {:?} is not a readable directory",
            root
        )));
    }

    if !recursive {
        return Ok(roots.to_vec());
    }

    let mut out = Vec::new();
    for root in roots {
        walk(fs, root, root, &mut out)?;
    }

    debug!(count = out.len(), "expanded watch paths");
    Ok(out)
}

fn walk(fs: &dyn FileSystem, root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    out.push(dir.to_path_buf());

    let mut children = fs
        .read_dir(dir)
        .map_err(|e| HotbuildError::Filesystem(format!("{e:#}")))?;
    children.sort();

    for child in children {
        if !fs.is_dir(&child) || fs.is_symlink(&child) {
            continue;
        }
        if is_hidden_below(root, &child) {
            trace!(path = ?child, "skipping hidden directory");
            continue;
        }
        walk(fs, root, &child, out)?;
    }

    Ok(())
}

/// True if any component of `path` below `root` starts with a dot.
fn is_hidden_below(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}
