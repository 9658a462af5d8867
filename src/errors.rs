// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! The variants follow how each failure is handled:
//! - `Configuration` / `Filesystem` abort startup before anything is watched.
//! - `Build` is recovered locally by the orchestrator (logged, loop continues).
//! - `ProcessLifecycle` is logged; a failed termination blocks the start of a
//!   second instance.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotbuildError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("Build error: {0}")]
    Build(String),

    #[error("Process lifecycle error: {0}")]
    ProcessLifecycle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("File watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HotbuildError>;
