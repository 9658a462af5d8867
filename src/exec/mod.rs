// src/exec/mod.rs

//! Process execution layer.
//!
//! Two subprocess kinds are involved in a rebuild:
//! - the compiler, run once per build attempt ([`compiler`]);
//! - the compiled program itself, started and stopped across rebuilds
//!   ([`process`]).
//!
//! Both sit behind small traits ([`CompilerBackend`], [`ProcessBackend`]) so
//! the orchestrator can be driven by fakes in tests while production uses
//! `tokio::process`.

use std::path::PathBuf;

pub mod compiler;
pub mod process;

pub use compiler::{BuildFuture, CompilerBackend, ToolchainCompiler};
pub use process::{ChildProcessBackend, ProcessBackend};

/// One compiler run: program, arguments and the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CompileInvocation {
    /// Space-joined rendering for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How to start the compiled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl LaunchSpec {
    /// Space-joined rendering for logs.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
