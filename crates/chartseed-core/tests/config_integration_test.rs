//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use chartseed_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn clear_env() {
    for key in [
        "CHARTSEED_WORK_DIR",
        "CHARTSEED_MAX_TILES",
        "CHARTSEED_MAX_EMPTY",
        "CHARTSEED_KEEP_LOGS",
        "CHARTSEED_SEED_COMMAND",
    ] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "max_tiles = 5000\nkeep_logs = 5").unwrap();

    env::set_var("CHARTSEED_MAX_TILES", "250000");

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.max_tiles.value, 250_000);
    assert_eq!(config.max_tiles.source, ConfigSource::Environment);
    assert_eq!(config.keep_logs.value, 5);
    assert_eq!(config.keep_logs.source, ConfigSource::File);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_value_is_ignored() {
    clear_env();
    env::set_var("CHARTSEED_MAX_EMPTY", "several");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.max_empty.value, 1);
    assert_eq!(config.max_empty.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_environment() {
    clear_env();
    env::set_var("CHARTSEED_WORK_DIR", "/tmp/from-env");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    assert_eq!(config.work_dir.source, ConfigSource::Environment);

    config.update_from_cli(CliConfigOverrides {
        work_dir: Some(PathBuf::from("/tmp/from-cli")),
        ..Default::default()
    });

    assert_eq!(config.work_dir.value, PathBuf::from("/tmp/from-cli"));
    assert_eq!(config.work_dir.source, ConfigSource::Cli);

    clear_env();
}

#[test]
#[serial]
fn test_full_precedence_chain() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "seed_command = \"file-seed\"\nmax_empty = 2").unwrap();
    env::set_var("CHARTSEED_SEED_COMMAND", "env-seed");

    let mut config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    config.update_from_cli(CliConfigOverrides { max_empty: Some(4), ..Default::default() });

    assert_eq!(config.seed_command.value, "env-seed");
    assert_eq!(config.max_empty.value, 4);
    assert_eq!(config.max_empty.source, ConfigSource::Cli);
    assert_eq!(config.max_zoom.source, ConfigSource::Default);

    clear_env();
}
