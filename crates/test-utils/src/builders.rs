#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use hotbuild::config::BuildOptions;
use hotbuild::engine::RuntimeOptions;
use hotbuild::types::{FlagCategory, SignalWhileBuilding};

/// Builder for `BuildOptions` to simplify test setup.
///
/// Starts from the defaults with an empty executable suffix, so expected
/// paths don't depend on the platform.
pub struct BuildOptionsBuilder {
    options: BuildOptions,
}

impl BuildOptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: BuildOptions {
                exe_suffix: String::new(),
                ..BuildOptions::default()
            },
        }
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.dirs.push(dir.into());
        self
    }

    pub fn output(mut self, output: &str) -> Self {
        self.options.output = Some(output.to_string());
        self
    }

    pub fn main_files(mut self, main_files: &str) -> Self {
        self.options.main_files = Some(main_files.to_string());
        self
    }

    pub fn exts(mut self, exts: &str) -> Self {
        self.options.exts = exts.to_string();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.options.recursive = recursive;
        self
    }

    pub fn app_args(mut self, app_args: &str) -> Self {
        self.options.app_args = app_args.to_string();
        self
    }

    pub fn flag(mut self, category: FlagCategory, value: &str) -> Self {
        self.options.flags.insert(category, value.to_string());
        self
    }

    pub fn exe_suffix(mut self, suffix: &str) -> Self {
        self.options.exe_suffix = suffix.to_string();
        self
    }

    pub fn toolchain(mut self, toolchain: &str) -> Self {
        self.options.toolchain = toolchain.to_string();
        self
    }

    pub fn build(self) -> BuildOptions {
        self.options
    }
}

impl Default for BuildOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime options with short timings for tests.
pub fn fast_runtime(while_building: SignalWhileBuilding) -> RuntimeOptions {
    RuntimeOptions {
        debounce: Duration::from_millis(50),
        grace_period: Duration::from_millis(100),
        while_building,
        initial_build: false,
    }
}
