//! Configuration loading utilities for CLI commands

use crate::cli::ConfigArgs;
use anyhow::{Context, Result};
use chartseed_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::PathBuf;

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    PathBuf::from(".chartseed").join("config.toml")
}

/// Load layered configuration: defaults, file, environment, then CLI.
///
/// A config file given with `--config` must exist, the default one is
/// optional.
pub fn load_config(args: &ConfigArgs, mut overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    let path = args.config_file.clone().unwrap_or_else(default_config_path);
    if args.config_file.is_some() || path.exists() {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }
    let mut config = config.load_from_env();

    overrides.work_dir = overrides.work_dir.or_else(|| args.work_dir.clone());
    overrides.box_database = overrides.box_database.or_else(|| args.box_database.clone());
    overrides.tile_config = overrides.tile_config.or_else(|| args.tile_config.clone());
    config.update_from_cli(overrides);

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
