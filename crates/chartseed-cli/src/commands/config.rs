//! Config command implementation

use crate::cli::ConfigArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::ConfigEntry;
use anyhow::Result;
use chartseed_core::config::CliConfigOverrides;

pub fn execute(args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(args, CliConfigOverrides::default())?;

    let mut rows: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry { key, value, source: format!("{:?}", source) })
        .collect();

    // Sort by key for consistent output
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        output.result(rows)?;
    } else {
        output.section("Configuration Values");
        output.table(rows);

        output.section("Configuration Precedence");
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}
