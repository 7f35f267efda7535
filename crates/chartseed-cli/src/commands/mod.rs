//! Command implementations

mod coalesce;
mod config;
mod count;
mod merge;
mod missing;
mod seed;
mod worker;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use chartseed_core::models::{parse_selection, ZoomBox};
use std::fs;
use std::path::Path;

/// Execute a CLI command
pub async fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    match cli.command {
        Commands::Merge(args) => merge::execute(args, &cli.config, output),
        Commands::Count(args) => count::execute(args, &cli.config, output),
        Commands::Missing(args) => missing::execute(args, &cli.config, output),
        Commands::Coalesce(args) => coalesce::execute(args, output),
        Commands::Config => config::execute(&cli.config, output),
        Commands::Seed(args) => seed::execute(args, &cli.config, output).await,
        Commands::Worker(args) => worker::execute(args),
    }
}

/// Read a JSON selection file
fn read_selection(path: &Path) -> Result<Vec<ZoomBox>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read selection {}", path.display()))?;
    let selection = parse_selection(&content)
        .with_context(|| format!("Failed to parse selection {}", path.display()))?;
    tracing::debug!("read {} selection boxes from {}", selection.len(), path.display());
    Ok(selection)
}

/// Write `content` to `path`, or to stdout without a path
fn write_text(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
