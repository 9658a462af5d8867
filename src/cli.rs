// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::types::SignalWhileBuilding;

/// Command-line arguments for `hotbuild`.
///
/// Every option may also come from `Hotbuild.toml`; values given here win.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hotbuild",
    version,
    about = "Rebuild and restart a compiled program whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Directories to watch. The first one is the primary directory: it is
    /// built, and by default the binary is written into it.
    ///
    /// Default: the current directory.
    #[arg(value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Files passed last to the build command (empty = build the package in
    /// the primary directory).
    #[arg(long = "main", value_name = "FILES")]
    pub main_files: Option<String>,

    /// Output binary. A bare name is placed in the primary directory.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Comma-separated extensions to watch; `*` watches every file and an
    /// empty value watches nothing.
    #[arg(long, value_name = "EXTS")]
    pub ext: Option<String>,

    /// Also watch subdirectories (hidden ones are skipped).
    #[arg(short, long, value_name = "BOOL", action = ArgAction::Set)]
    pub recursive: Option<bool>,

    /// Arguments passed to the program, e.g. `-port=8080 -name "my app"`.
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub app_args: Option<String>,

    /// Forwarded to the build command's `-asmflags`.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub asmflags: Option<String>,

    /// Forwarded to the build command's `-gccgoflags`.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub gccgoflags: Option<String>,

    /// Forwarded to the build command's `-gcflags`.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub gcflags: Option<String>,

    /// Forwarded to the build command's `-ldflags`.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Toolchain driver to run (`<toolchain> build ...`). Default: `go`.
    #[arg(long, value_name = "PROGRAM")]
    pub toolchain: Option<String>,

    /// Executable suffix appended to the output name.
    ///
    /// If omitted, `HOTBUILD_EXE_SUFFIX` or the platform suffix is used.
    #[arg(long, value_name = "SUFFIX")]
    pub exe_suffix: Option<String>,

    /// Quiet period that closes a burst of changes, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// How long a stopped program may take to exit before it is killed,
    /// in milliseconds.
    #[arg(long, value_name = "MS")]
    pub grace_period_ms: Option<u64>,

    /// What a change does while a build is running (restart, queue).
    #[arg(long, value_name = "BEHAVIOUR")]
    pub while_building: Option<SignalWhileBuilding>,

    /// Do not build until the first change is seen.
    #[arg(long)]
    pub no_initial_build: bool,

    /// Path to a config file (TOML).
    ///
    /// Default: `Hotbuild.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
