//! Count command implementation

use super::read_selection;
use crate::cli::{ConfigArgs, CountArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::CountOutput;
use anyhow::Result;
use chartseed_core::config::CliConfigOverrides;
use chartseed_geo::{BoxDatabase, BoxMerger};

pub fn execute(args: CountArgs, config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides {
        min_zoom: args.zoom.min_zoom,
        max_zoom: args.zoom.max_zoom,
        max_tiles: args.max_tiles,
        ..Default::default()
    };
    let config = load_config(config_args, overrides)?;

    let selection = read_selection(&args.selection)?;
    let db = BoxDatabase::new(&config.box_database.value);
    let merged = BoxMerger::new(config.min_zoom.value, config.max_zoom.value)
        .merge_database(&db, &selection)?;

    let max_tiles = config.max_tiles.value;
    let result = CountOutput {
        box_count: merged.boxes.len(),
        num_tiles: merged.num_tiles,
        max_tiles,
        within_budget: merged.num_tiles <= max_tiles,
    };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.kv("Boxes", result.box_count);
        output.kv("Tiles", result.num_tiles);
        if result.within_budget {
            output.success(format!("within the budget of {} tiles", max_tiles));
        } else {
            output.warning(format!("larger than the budget of {} tiles", max_tiles));
        }
    }
    Ok(())
}
