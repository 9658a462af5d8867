// src/watch/event_handler.rs

//! Filtering of raw notify events down to relevant changed paths.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind};

use crate::watch::extensions::ExtensionFilter;

/// Decides which raw filesystem events count as source changes.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    exts: ExtensionFilter,
    /// Paths written by ourselves (the output binary); never a trigger.
    ignored: Vec<PathBuf>,
}

impl ChangeFilter {
    pub fn new(exts: ExtensionFilter, ignored: Vec<PathBuf>) -> Self {
        Self { exts, ignored }
    }

    /// Paths of `event` that should feed the debouncer.
    ///
    /// Pure access events (opens, reads, closes) never change sources and
    /// are dropped outright.
    pub fn accepted_paths(&self, event: &Event) -> Vec<PathBuf> {
        if matches!(event.kind, EventKind::Access(_)) {
            return Vec::new();
        }

        event
            .paths
            .iter()
            .filter(|path| self.accepts(path))
            .cloned()
            .collect()
    }

    pub fn accepts(&self, path: &Path) -> bool {
        if self.ignored.iter().any(|ignored| ignored == path) {
            return false;
        }
        self.exts.matches(path)
    }
}
