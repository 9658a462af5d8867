// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Behaviour when a rebuild signal arrives while a compile is in flight.
///
/// - `Restart`: kill the running compiler and start a fresh attempt once it
///   has exited (default behaviour).
/// - `Queue`: let the running compile finish, then start exactly one more
///   attempt. Further signals while building collapse into that one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalWhileBuilding {
    #[default]
    Restart,
    Queue,
}

impl FromStr for SignalWhileBuilding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "restart" => Ok(SignalWhileBuilding::Restart),
            "queue" => Ok(SignalWhileBuilding::Queue),
            other => Err(format!(
                "invalid while_building behaviour: {other} (expected \"restart\" or \"queue\")"
            )),
        }
    }
}

/// Toolchain stage that extra flags are forwarded to.
///
/// Each category maps onto one `-<x>flags` option of the build command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum FlagCategory {
    #[serde(rename = "asm", alias = "assembler")]
    Assembler,
    #[serde(rename = "gccgo", alias = "external-compiler")]
    ExternalCompiler,
    #[serde(rename = "gc", alias = "general-compiler")]
    GeneralCompiler,
    #[serde(rename = "ld", alias = "linker")]
    Linker,
}

impl FlagCategory {
    pub const ALL: [FlagCategory; 4] = [
        FlagCategory::Assembler,
        FlagCategory::ExternalCompiler,
        FlagCategory::GeneralCompiler,
        FlagCategory::Linker,
    ];

    /// Short toolchain prefix (`asm`, `gccgo`, `gc`, `ld`).
    pub fn prefix(self) -> &'static str {
        match self {
            FlagCategory::Assembler => "asm",
            FlagCategory::ExternalCompiler => "gccgo",
            FlagCategory::GeneralCompiler => "gc",
            FlagCategory::Linker => "ld",
        }
    }

    /// The build command option this category is passed through, e.g. `-ldflags`.
    pub fn option(self) -> String {
        format!("-{}flags", self.prefix())
    }
}

impl fmt::Display for FlagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for FlagCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asm" | "assembler" => Ok(FlagCategory::Assembler),
            "gccgo" | "external-compiler" => Ok(FlagCategory::ExternalCompiler),
            "gc" | "general-compiler" => Ok(FlagCategory::GeneralCompiler),
            "ld" | "linker" => Ok(FlagCategory::Linker),
            other => Err(format!(
                "unknown flag category: {other} (expected asm, gccgo, gc or ld)"
            )),
        }
    }
}
