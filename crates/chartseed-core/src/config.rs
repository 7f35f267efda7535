use crate::error::{ChartseedError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for Chartseed
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Directory holding seed config, progress, info and log files
    pub work_dir: ConfigValue<PathBuf>,
    /// Reference box database (one `name zoom swlat swlng nelat nelng` per line)
    pub box_database: ConfigValue<PathBuf>,
    /// Tile cache configuration handed to the seed command
    pub tile_config: ConfigValue<PathBuf>,
    /// Command run by the worker to generate tiles
    pub seed_command: ConfigValue<String>,
    pub max_tiles: ConfigValue<u64>,
    /// Number of zoom levels that may stay empty below a covered level
    pub max_empty: ConfigValue<u32>,
    pub min_zoom: ConfigValue<i32>,
    pub max_zoom: ConfigValue<i32>,
    /// Number of seed log files retained after a run
    pub keep_logs: ConfigValue<usize>,
    pub poll_interval_ms: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            work_dir: ConfigValue::new(PathBuf::from(".chartseed/seed"), ConfigSource::Default),
            box_database: ConfigValue::new(
                PathBuf::from("boxes/allcountries.bbox"),
                ConfigSource::Default,
            ),
            tile_config: ConfigValue::new(PathBuf::from("mapproxy.yaml"), ConfigSource::Default),
            seed_command: ConfigValue::new("mapproxy-seed".to_string(), ConfigSource::Default),
            max_tiles: ConfigValue::new(100_000, ConfigSource::Default),
            max_empty: ConfigValue::new(1, ConfigSource::Default),
            min_zoom: ConfigValue::new(0, ConfigSource::Default),
            max_zoom: ConfigValue::new(20, ConfigSource::Default),
            keep_logs: ConfigValue::new(20, ConfigSource::Default),
            poll_interval_ms: ConfigValue::new(1000, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ChartseedError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ChartseedError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(work_dir) = file_config.work_dir {
            self.work_dir.update(work_dir, ConfigSource::File);
        }
        if let Some(box_database) = file_config.box_database {
            self.box_database.update(box_database, ConfigSource::File);
        }
        if let Some(tile_config) = file_config.tile_config {
            self.tile_config.update(tile_config, ConfigSource::File);
        }
        if let Some(seed_command) = file_config.seed_command {
            self.seed_command.update(seed_command, ConfigSource::File);
        }
        if let Some(max_tiles) = file_config.max_tiles {
            self.max_tiles.update(max_tiles, ConfigSource::File);
        }
        if let Some(max_empty) = file_config.max_empty {
            self.max_empty.update(max_empty, ConfigSource::File);
        }
        if let Some(min_zoom) = file_config.min_zoom {
            self.min_zoom.update(min_zoom, ConfigSource::File);
        }
        if let Some(max_zoom) = file_config.max_zoom {
            self.max_zoom.update(max_zoom, ConfigSource::File);
        }
        if let Some(keep_logs) = file_config.keep_logs {
            self.keep_logs.update(keep_logs, ConfigSource::File);
        }
        if let Some(poll_interval_ms) = file_config.poll_interval_ms {
            self.poll_interval_ms.update(poll_interval_ms, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(work_dir) = env::var("CHARTSEED_WORK_DIR") {
            self.work_dir.update(PathBuf::from(work_dir), ConfigSource::Environment);
        }
        if let Ok(box_database) = env::var("CHARTSEED_BOX_DATABASE") {
            self.box_database.update(PathBuf::from(box_database), ConfigSource::Environment);
        }
        if let Ok(tile_config) = env::var("CHARTSEED_TILE_CONFIG") {
            self.tile_config.update(PathBuf::from(tile_config), ConfigSource::Environment);
        }
        if let Ok(seed_command) = env::var("CHARTSEED_SEED_COMMAND") {
            self.seed_command.update(seed_command, ConfigSource::Environment);
        }

        if let Some(max_tiles) = env_number("CHARTSEED_MAX_TILES") {
            self.max_tiles.update(max_tiles, ConfigSource::Environment);
        }
        if let Some(max_empty) = env_number("CHARTSEED_MAX_EMPTY") {
            self.max_empty.update(max_empty, ConfigSource::Environment);
        }
        if let Some(min_zoom) = env_number("CHARTSEED_MIN_ZOOM") {
            self.min_zoom.update(min_zoom, ConfigSource::Environment);
        }
        if let Some(max_zoom) = env_number("CHARTSEED_MAX_ZOOM") {
            self.max_zoom.update(max_zoom, ConfigSource::Environment);
        }
        if let Some(keep_logs) = env_number("CHARTSEED_KEEP_LOGS") {
            self.keep_logs.update(keep_logs, ConfigSource::Environment);
        }
        if let Some(poll_interval_ms) = env_number("CHARTSEED_POLL_INTERVAL_MS") {
            self.poll_interval_ms.update(poll_interval_ms, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(work_dir) = overrides.work_dir {
            self.work_dir.update(work_dir, ConfigSource::Cli);
        }
        if let Some(box_database) = overrides.box_database {
            self.box_database.update(box_database, ConfigSource::Cli);
        }
        if let Some(tile_config) = overrides.tile_config {
            self.tile_config.update(tile_config, ConfigSource::Cli);
        }
        if let Some(max_tiles) = overrides.max_tiles {
            self.max_tiles.update(max_tiles, ConfigSource::Cli);
        }
        if let Some(max_empty) = overrides.max_empty {
            self.max_empty.update(max_empty, ConfigSource::Cli);
        }
        if let Some(min_zoom) = overrides.min_zoom {
            self.min_zoom.update(min_zoom, ConfigSource::Cli);
        }
        if let Some(max_zoom) = overrides.max_zoom {
            self.max_zoom.update(max_zoom, ConfigSource::Cli);
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.min_zoom.value > self.max_zoom.value {
            return Err(ChartseedError::ConfigInvalid {
                key: "min_zoom".to_string(),
                reason: format!(
                    "min_zoom {} is above max_zoom {}",
                    self.min_zoom.value, self.max_zoom.value
                ),
            });
        }
        if self.seed_command.value.trim().is_empty() {
            return Err(ChartseedError::ConfigMissing { key: "seed_command".to_string() });
        }
        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "work_dir".to_string(),
            (self.work_dir.value.display().to_string(), self.work_dir.source),
        );
        map.insert(
            "box_database".to_string(),
            (self.box_database.value.display().to_string(), self.box_database.source),
        );
        map.insert(
            "tile_config".to_string(),
            (self.tile_config.value.display().to_string(), self.tile_config.source),
        );
        map.insert(
            "seed_command".to_string(),
            (self.seed_command.value.clone(), self.seed_command.source),
        );
        map.insert(
            "max_tiles".to_string(),
            (self.max_tiles.value.to_string(), self.max_tiles.source),
        );
        map.insert(
            "max_empty".to_string(),
            (self.max_empty.value.to_string(), self.max_empty.source),
        );
        map.insert("min_zoom".to_string(), (self.min_zoom.value.to_string(), self.min_zoom.source));
        map.insert("max_zoom".to_string(), (self.max_zoom.value.to_string(), self.max_zoom.source));
        map.insert(
            "keep_logs".to_string(),
            (self.keep_logs.value.to_string(), self.keep_logs.source),
        );
        map.insert(
            "poll_interval_ms".to_string(),
            (self.poll_interval_ms.value.to_string(), self.poll_interval_ms.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    work_dir: Option<PathBuf>,
    box_database: Option<PathBuf>,
    tile_config: Option<PathBuf>,
    seed_command: Option<String>,
    max_tiles: Option<u64>,
    max_empty: Option<u32>,
    min_zoom: Option<i32>,
    max_zoom: Option<i32>,
    keep_logs: Option<usize>,
    poll_interval_ms: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub work_dir: Option<PathBuf>,
    pub box_database: Option<PathBuf>,
    pub tile_config: Option<PathBuf>,
    pub max_tiles: Option<u64>,
    pub max_empty: Option<u32>,
    pub min_zoom: Option<i32>,
    pub max_zoom: Option<i32>,
}

/// Read a numeric environment variable, warning on unparsable values
fn env_number<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected a number", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.max_tiles.value, 100_000);
        assert_eq!(config.max_tiles.source, ConfigSource::Default);
        assert_eq!(config.max_empty.value, 1);
        assert_eq!(config.keep_logs.value, 20);
        assert_eq!(config.seed_command.value, "mapproxy-seed");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
work_dir = "/var/lib/chartseed"
max_tiles = 5000
max_empty = 2
keep_logs = 3
seed_command = "/usr/bin/mapproxy-seed"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.work_dir.value, PathBuf::from("/var/lib/chartseed"));
        assert_eq!(config.work_dir.source, ConfigSource::File);
        assert_eq!(config.max_tiles.value, 5000);
        assert_eq!(config.max_empty.value, 2);
        assert_eq!(config.keep_logs.value, 3);
        assert_eq!(config.seed_command.value, "/usr/bin/mapproxy-seed");
        assert_eq!(config.min_zoom.source, ConfigSource::Default);
    }

    #[test]
    fn test_load_from_file_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_tiles = \"lots\"").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(ChartseedError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            max_zoom: Some(16),
            max_empty: Some(3),
            ..Default::default()
        });

        assert_eq!(config.max_zoom.value, 16);
        assert_eq!(config.max_zoom.source, ConfigSource::Cli);
        assert_eq!(config.max_empty.value, 3);
        assert_eq!(config.min_zoom.source, ConfigSource::Default);
    }

    #[test]
    fn test_validate_zoom_window() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            min_zoom: Some(12),
            max_zoom: Some(8),
            ..Default::default()
        });

        assert!(matches!(config.validate(), Err(ChartseedError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 10);
        let (value, source) = &map["max_tiles"];
        assert_eq!(value, "100000");
        assert_eq!(*source, ConfigSource::Default);
    }
}
