// src/config/settings.rs

//! Merge of CLI arguments, the optional config file and built-in defaults.
//!
//! Precedence, highest first: command line, `Hotbuild.toml`, environment
//! (`HOTBUILD_EXE_SUFFIX` only), defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::CliArgs;
use crate::config::build_spec::BuildOptions;
use crate::config::model::RawConfigFile;
use crate::engine::RuntimeOptions;
use crate::errors::{HotbuildError, Result};
use crate::types::FlagCategory;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 5_000;

/// Environment variable overriding the platform executable suffix.
pub const EXE_SUFFIX_ENV: &str = "HOTBUILD_EXE_SUFFIX";

/// Fully merged settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub build: BuildOptions,
    pub runtime: RuntimeOptions,
}

impl Settings {
    pub fn resolve(
        cli: &CliArgs,
        file: Option<RawConfigFile>,
        env_exe_suffix: Option<String>,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = BuildOptions::default();

        let dirs = if !cli.dirs.is_empty() {
            cli.dirs.clone()
        } else if !file.dirs.is_empty() {
            file.dirs.clone()
        } else {
            vec![PathBuf::from(".")]
        };

        let mut flags = file.flags.clone();
        let cli_flags = [
            (FlagCategory::Assembler, &cli.asmflags),
            (FlagCategory::ExternalCompiler, &cli.gccgoflags),
            (FlagCategory::GeneralCompiler, &cli.gcflags),
            (FlagCategory::Linker, &cli.ldflags),
        ];
        for (category, value) in cli_flags {
            if let Some(value) = value {
                flags.insert(category, value.clone());
            }
        }

        let build = BuildOptions {
            main_files: cli.main_files.clone().or(file.main),
            output: cli.output.clone().or(file.output),
            flags,
            exts: cli.ext.clone().or(file.ext).unwrap_or(defaults.exts),
            recursive: cli.recursive.or(file.recursive).unwrap_or(defaults.recursive),
            app_args: cli
                .app_args
                .clone()
                .or(file.app_args)
                .unwrap_or(defaults.app_args),
            dirs,
            exe_suffix: cli
                .exe_suffix
                .clone()
                .or(file.exe_suffix)
                .or(env_exe_suffix)
                .unwrap_or(defaults.exe_suffix),
            toolchain: cli
                .toolchain
                .clone()
                .or(file.toolchain)
                .unwrap_or(defaults.toolchain),
        };

        let debounce_ms = cli
            .debounce_ms
            .or(file.debounce_ms)
            .unwrap_or(DEFAULT_DEBOUNCE_MS);
        let grace_period_ms = cli
            .grace_period_ms
            .or(file.grace_period_ms)
            .unwrap_or(DEFAULT_GRACE_PERIOD_MS);

        if debounce_ms == 0 {
            return Err(HotbuildError::Configuration(
                "debounce_ms must be greater than zero".to_string(),
            ));
        }
        if grace_period_ms == 0 {
            return Err(HotbuildError::Configuration(
                "grace_period_ms must be greater than zero".to_string(),
            ));
        }

        let runtime = RuntimeOptions {
            debounce: Duration::from_millis(debounce_ms),
            grace_period: Duration::from_millis(grace_period_ms),
            while_building: cli
                .while_building
                .or(file.while_building)
                .unwrap_or_default(),
            initial_build: !cli.no_initial_build && file.initial_build.unwrap_or(true),
        };

        Ok(Self { build, runtime })
    }
}

/// Read the executable suffix override from the environment.
pub fn exe_suffix_from_env() -> Option<String> {
    std::env::var(EXE_SUFFIX_ENV).ok()
}
