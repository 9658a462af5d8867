// src/config/mod.rs

pub mod args;
pub mod build_spec;
pub mod loader;
pub mod model;
pub mod settings;

pub use args::split_args;
pub use build_spec::{resolve_output_path, BuildOptions, BuildSpec, DEFAULT_TOOLCHAIN};
pub use loader::{load_config, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::RawConfigFile;
pub use settings::{exe_suffix_from_env, Settings};
