// tests/config_file.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use hotbuild::cli::CliArgs;
use hotbuild::config::{load_config, load_from_path, RawConfigFile, Settings};
use hotbuild::errors::HotbuildError;
use hotbuild::types::{FlagCategory, SignalWhileBuilding};
use tempfile::{NamedTempFile, TempDir};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("Hotbuild.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn parses_full_config_file() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
main = "main.go"
output = "server"
ext = "go, tpl"
recursive = false
app_args = "-port=8080"
dirs = ["cmd/server", "/abs/lib"]
toolchain = "go1.22"
debounce_ms = 150
grace_period_ms = 2000
while_building = "queue"
initial_build = false

[flags]
ld = "-s -w"
general-compiler = "all=-N -l"
"#,
    );

    let cfg = load_from_path(&path)?;

    assert_eq!(cfg.main.as_deref(), Some("main.go"));
    assert_eq!(cfg.recursive, Some(false));
    assert_eq!(cfg.while_building, Some(SignalWhileBuilding::Queue));
    assert_eq!(cfg.initial_build, Some(false));
    assert_eq!(
        cfg.dirs,
        vec![dir.path().join("cmd/server"), PathBuf::from("/abs/lib")]
    );
    assert_eq!(cfg.flags.get(&FlagCategory::Linker).map(String::as_str), Some("-s -w"));
    assert_eq!(
        cfg.flags.get(&FlagCategory::GeneralCompiler).map(String::as_str),
        Some("all=-N -l")
    );
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "ext = \"go\"\nwatch_everything = true\n").unwrap();

    let result = load_from_path(file.path());

    match result {
        Err(HotbuildError::Toml(e)) => assert!(e.to_string().contains("watch_everything")),
        other => panic!("expected TOML error, got {other:?}"),
    }
}

#[test]
fn missing_explicit_config_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = load_config(Some(&missing)).unwrap_err();

    assert!(matches!(err, HotbuildError::Configuration(_)), "got {err:?}");
}

#[test]
fn defaults_apply_without_cli_or_file() -> TestResult {
    let cli = CliArgs::try_parse_from(["hotbuild"])?;

    let settings = Settings::resolve(&cli, None, None)?;

    assert_eq!(settings.build.dirs, vec![PathBuf::from(".")]);
    assert_eq!(settings.build.exts, "go");
    assert!(settings.build.recursive);
    assert_eq!(settings.build.toolchain, "go");
    assert_eq!(settings.build.exe_suffix, std::env::consts::EXE_SUFFIX);
    assert_eq!(settings.runtime.debounce, Duration::from_millis(300));
    assert_eq!(settings.runtime.grace_period, Duration::from_secs(5));
    assert_eq!(settings.runtime.while_building, SignalWhileBuilding::Restart);
    assert!(settings.runtime.initial_build);
    Ok(())
}

#[test]
fn cli_wins_over_file_and_file_over_defaults() -> TestResult {
    let cli = CliArgs::try_parse_from([
        "hotbuild",
        "--ext",
        "go,tpl",
        "--ldflags",
        "-X main.version=dev",
        "--while-building",
        "restart",
        "--app-args",
        "-v -port=9090",
        "api",
    ])?;
    let file = RawConfigFile {
        ext: Some("go".to_string()),
        output: Some("server".to_string()),
        recursive: Some(false),
        dirs: vec![PathBuf::from("/ignored")],
        while_building: Some(SignalWhileBuilding::Queue),
        debounce_ms: Some(75),
        flags: [
            (FlagCategory::Linker, "-s -w".to_string()),
            (FlagCategory::Assembler, "-trimpath".to_string()),
        ]
        .into_iter()
        .collect(),
        ..RawConfigFile::default()
    };

    let settings = Settings::resolve(&cli, Some(file), Some(".bin".to_string()))?;

    assert_eq!(settings.build.exts, "go,tpl");
    assert_eq!(settings.build.dirs, vec![PathBuf::from("api")]);
    assert_eq!(settings.build.output.as_deref(), Some("server"));
    assert!(!settings.build.recursive);
    assert_eq!(settings.build.app_args, "-v -port=9090");
    assert_eq!(settings.build.exe_suffix, ".bin");
    assert_eq!(
        settings.build.flags.get(&FlagCategory::Linker).map(String::as_str),
        Some("-X main.version=dev")
    );
    assert_eq!(
        settings.build.flags.get(&FlagCategory::Assembler).map(String::as_str),
        Some("-trimpath")
    );
    assert_eq!(settings.runtime.while_building, SignalWhileBuilding::Restart);
    assert_eq!(settings.runtime.debounce, Duration::from_millis(75));
    Ok(())
}

#[test]
fn exe_suffix_precedence() -> TestResult {
    let file = RawConfigFile {
        exe_suffix: Some(".file".to_string()),
        ..RawConfigFile::default()
    };

    let cli = CliArgs::try_parse_from(["hotbuild"])?;
    let settings = Settings::resolve(&cli, Some(file.clone()), Some(".env".to_string()))?;
    assert_eq!(settings.build.exe_suffix, ".file");

    let settings = Settings::resolve(&cli, None, Some(".env".to_string()))?;
    assert_eq!(settings.build.exe_suffix, ".env");

    let cli = CliArgs::try_parse_from(["hotbuild", "--exe-suffix", ".cli"])?;
    let settings = Settings::resolve(&cli, Some(file), Some(".env".to_string()))?;
    assert_eq!(settings.build.exe_suffix, ".cli");
    Ok(())
}

#[test]
fn initial_build_can_be_disabled_from_either_side() -> TestResult {
    let cli = CliArgs::try_parse_from(["hotbuild", "--no-initial-build"])?;
    assert!(!Settings::resolve(&cli, None, None)?.runtime.initial_build);

    let cli = CliArgs::try_parse_from(["hotbuild"])?;
    let file = RawConfigFile {
        initial_build: Some(false),
        ..RawConfigFile::default()
    };
    assert!(!Settings::resolve(&cli, Some(file), None)?.runtime.initial_build);
    Ok(())
}

#[test]
fn zero_durations_are_rejected() {
    let cli = CliArgs::try_parse_from(["hotbuild", "--debounce-ms", "0"]).unwrap();
    let err = Settings::resolve(&cli, None, None).unwrap_err();
    assert!(matches!(err, HotbuildError::Configuration(_)), "got {err:?}");

    let file = RawConfigFile {
        grace_period_ms: Some(0),
        ..RawConfigFile::default()
    };
    let cli = CliArgs::try_parse_from(["hotbuild"]).unwrap();
    let err = Settings::resolve(&cli, Some(file), None).unwrap_err();
    assert!(matches!(err, HotbuildError::Configuration(_)), "got {err:?}");
}

#[test]
fn invalid_while_building_value_is_rejected_by_cli() {
    let result = CliArgs::try_parse_from(["hotbuild", "--while-building", "sometimes"]);
    assert!(result.is_err());
}
