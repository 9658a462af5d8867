// src/config/build_spec.rs

//! Resolution of the user-facing options into an immutable [`BuildSpec`].

use std::collections::BTreeMap;
use std::path::{self, Path, PathBuf, MAIN_SEPARATOR};

use crate::config::args::split_args;
use crate::errors::{HotbuildError, Result};
use crate::exec::{CompileInvocation, LaunchSpec};
use crate::types::FlagCategory;
use crate::watch::ExtensionFilter;

/// Toolchain driver invoked when no other is configured.
pub const DEFAULT_TOOLCHAIN: &str = "go";

/// Raw inputs of one orchestration run, before any path resolution.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Files (or package pattern) passed last to the build command.
    /// `None` builds the primary directory.
    pub main_files: Option<String>,
    /// Output binary; `None` derives it from the primary directory name.
    pub output: Option<String>,
    /// Extra flags per toolchain stage, forwarded verbatim.
    pub flags: BTreeMap<FlagCategory, String>,
    /// Comma-separated watched extensions.
    pub exts: String,
    pub recursive: bool,
    /// Raw argument string for the child program.
    pub app_args: String,
    /// Watched roots; the first one is the primary directory.
    pub dirs: Vec<PathBuf>,
    /// Platform executable suffix appended to the output name.
    pub exe_suffix: String,
    pub toolchain: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            main_files: None,
            output: None,
            flags: BTreeMap::new(),
            exts: "go".to_string(),
            recursive: true,
            app_args: String::new(),
            dirs: Vec::new(),
            exe_suffix: std::env::consts::EXE_SUFFIX.to_string(),
            toolchain: DEFAULT_TOOLCHAIN.to_string(),
        }
    }
}

/// Immutable configuration of one orchestration run.
#[derive(Debug, Clone)]
pub struct BuildSpec {
    main_files: Vec<String>,
    output: PathBuf,
    flags: BTreeMap<FlagCategory, String>,
    exts: ExtensionFilter,
    recursive: bool,
    app_args: Vec<String>,
    roots: Vec<PathBuf>,
    toolchain: String,
    working_dir: PathBuf,
}

impl BuildSpec {
    /// Validate and resolve `opts`.
    ///
    /// Fails with a configuration error when no directory is given or a
    /// directory / the output path cannot be made absolute.
    pub fn resolve(opts: BuildOptions) -> Result<Self> {
        if opts.dirs.is_empty() {
            return Err(HotbuildError::Configuration(
                "at least one directory to watch is required".to_string(),
            ));
        }

        let roots = opts
            .dirs
            .iter()
            .map(|dir| absolutize(dir))
            .collect::<Result<Vec<_>>>()?;
        let primary = &roots[0];

        let output = resolve_output_path(opts.output.as_deref(), primary, &opts.exe_suffix)?;
        let working_dir = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| primary.clone());

        let toolchain = if opts.toolchain.trim().is_empty() {
            DEFAULT_TOOLCHAIN.to_string()
        } else {
            opts.toolchain.trim().to_string()
        };

        Ok(Self {
            main_files: opts.main_files.as_deref().map(split_args).unwrap_or_default(),
            output,
            flags: opts
                .flags
                .into_iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .collect(),
            exts: ExtensionFilter::parse(&opts.exts),
            recursive: opts.recursive,
            app_args: split_args(&opts.app_args),
            roots,
            toolchain,
            working_dir,
        })
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn exts(&self) -> &ExtensionFilter {
        &self.exts
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn app_args(&self) -> &[String] {
        &self.app_args
    }

    pub fn main_files(&self) -> &[String] {
        &self.main_files
    }

    pub fn flags(&self) -> &BTreeMap<FlagCategory, String> {
        &self.flags
    }

    /// All watched roots, primary first.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn primary_root(&self) -> &Path {
        &self.roots[0]
    }

    /// Directory the child program runs in.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn toolchain(&self) -> &str {
        &self.toolchain
    }

    /// `build -o <output> [-<cat>flags <value>]* -v [<main files>]`, run in
    /// the primary directory.
    pub fn compile_invocation(&self) -> CompileInvocation {
        let mut args = vec![
            "build".to_string(),
            "-o".to_string(),
            self.output.to_string_lossy().into_owned(),
        ];
        for (category, value) in &self.flags {
            args.push(category.option());
            args.push(value.clone());
        }
        args.push("-v".to_string());
        args.extend(self.main_files.iter().cloned());

        CompileInvocation {
            program: self.toolchain.clone(),
            args,
            cwd: self.primary_root().to_path_buf(),
        }
    }

    /// `<output> <app args>` in the working directory.
    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            program: self.output.clone(),
            args: self.app_args.clone(),
            cwd: self.working_dir.clone(),
        }
    }
}

/// Work out the absolute path of the output binary.
///
/// - no name given: the base name of `primary`;
/// - `exe_suffix` is appended unless the name already ends with it;
/// - a bare file name (no separator) is placed inside `primary`;
/// - the result is made absolute.
pub fn resolve_output_path(
    output: Option<&str>,
    primary: &Path,
    exe_suffix: &str,
) -> Result<PathBuf> {
    let mut name = match output.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => primary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                HotbuildError::Configuration(format!(
                    "cannot derive an output name from directory {:?}",
                    primary
                ))
            })?,
    };

    if !exe_suffix.is_empty() && !name.ends_with(exe_suffix) {
        name.push_str(exe_suffix);
    }

    let has_separator = name.contains('/') || name.contains(MAIN_SEPARATOR);
    let path = if has_separator {
        PathBuf::from(name)
    } else {
        primary.join(name)
    };

    absolutize(&path)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    path::absolute(path).map_err(|e| {
        HotbuildError::Configuration(format!("cannot resolve path {:?}: {e}", path))
    })
}
