// src/watch/extensions.rs

use std::fmt;
use std::path::Path;

/// Entry that matches every file.
pub const WILDCARD: &str = "*";

/// Normalised set of watched file suffixes.
///
/// Built from a comma-separated list such as `"go, tpl ,.html"`, which
/// yields `[".go", ".tpl", ".html"]`. An empty list is valid and means no
/// file is watched at all; it is *not* a wildcard. A literal `*` entry
/// matches every path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    exts: Vec<String>,
}

impl ExtensionFilter {
    /// Parse a comma-separated extension list.
    ///
    /// Segments are trimmed, empty segments dropped and a leading `.` added
    /// where missing. Order is preserved and duplicates are kept.
    pub fn parse(list: &str) -> Self {
        let exts = list
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext == WILDCARD || ext.starts_with('.') {
                    ext.to_string()
                } else {
                    format!(".{ext}")
                }
            })
            .collect();

        Self { exts }
    }

    pub fn extensions(&self) -> &[String] {
        &self.exts
    }

    /// True when nothing will ever match.
    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }

    /// True when a `*` entry is present.
    pub fn is_wildcard(&self) -> bool {
        self.exts.iter().any(|ext| ext == WILDCARD)
    }

    /// Whether a change to `path` is relevant.
    pub fn matches(&self, path: &Path) -> bool {
        if self.is_wildcard() {
            return true;
        }
        if self.is_empty() {
            return false;
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => {
                let dotted = format!(".{ext}");
                self.exts.iter().any(|e| *e == dotted)
            }
            None => false,
        }
    }
}

/// Comma-joined, so that `ExtensionFilter::parse(&f.to_string()) == f`.
impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.exts.join(","))
    }
}
