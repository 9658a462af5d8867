// src/config/model.rs

//! Shape of the optional `Hotbuild.toml` file.
//!
//! ```toml
//! dirs = ["cmd/server", "internal"]
//! ext = "go, tpl"
//! app_args = "-port=8080 -name \"my app\""
//! while_building = "restart"
//!
//! [flags]
//! ld = "-s -w"
//! ```
//!
//! Every key is optional; anything missing falls back to the CLI value or
//! the built-in default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{FlagCategory, SignalWhileBuilding};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    pub main: Option<String>,
    pub output: Option<String>,
    pub ext: Option<String>,
    pub recursive: Option<bool>,
    pub app_args: Option<String>,
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    pub toolchain: Option<String>,
    pub exe_suffix: Option<String>,
    pub debounce_ms: Option<u64>,
    pub grace_period_ms: Option<u64>,
    pub while_building: Option<SignalWhileBuilding>,
    pub initial_build: Option<bool>,
    #[serde(default)]
    pub flags: BTreeMap<FlagCategory, String>,
}

impl RawConfigFile {
    /// Make relative `dirs` relative to `base` (the config file's directory)
    /// rather than to wherever the tool happens to be started.
    pub fn rebase_dirs(&mut self, base: &Path) {
        for dir in &mut self.dirs {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}
