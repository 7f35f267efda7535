//! Merge command implementation

use super::{read_selection, write_text};
use crate::cli::{ConfigArgs, MergeArgs, MergeFormat};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{BoxRow, MergeOutput};
use anyhow::{Context, Result};
use chartseed_core::config::CliConfigOverrides;
use chartseed_geo::database::to_line;
use chartseed_geo::export::to_feature_collection;
use chartseed_geo::{plan_seed, BoxDatabase, PlanOptions};
use chartseed_seed::SeedDocument;

pub fn execute(args: MergeArgs, config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides {
        min_zoom: args.zoom.min_zoom,
        max_zoom: args.zoom.max_zoom,
        max_empty: args.max_empty,
        ..Default::default()
    };
    let config = load_config(config_args, overrides)?;

    let selection = read_selection(&args.selection)?;
    let db = BoxDatabase::new(&config.box_database.value);
    let options = PlanOptions {
        min_zoom: config.min_zoom.value,
        max_zoom: config.max_zoom.value,
        fill_gaps: args.fill_gaps.then_some(config.max_empty.value),
    };
    let plan = plan_seed(&db, &selection, options)
        .with_context(|| format!("Failed to merge with {}", db.path().display()))?;
    let boxes = plan.boxes();

    match args.format {
        MergeFormat::Table => {
            let rows: Vec<BoxRow> = boxes.iter().map(BoxRow::from).collect();
            if output.is_json() {
                output.result(MergeOutput {
                    boxes: rows,
                    merged_count: plan.merged.len(),
                    synthesized_count: plan.synthesized.len(),
                    num_tiles: plan.num_tiles,
                    total_tiles: plan.total_tiles(),
                })?;
            } else {
                output.table(rows);
                output.kv("Merged boxes", plan.merged.len());
                if args.fill_gaps {
                    output.kv("Synthesized boxes", plan.synthesized.len());
                }
                output.kv("Tiles", plan.total_tiles());
            }
        }
        MergeFormat::Lines => {
            let mut lines = String::new();
            for b in &boxes {
                lines.push_str(&to_line(b));
                lines.push('\n');
            }
            write_text(args.output.as_deref(), &lines)?;
        }
        MergeFormat::Geojson => {
            let collection = to_feature_collection(&boxes);
            let mut json = serde_json::to_string_pretty(&collection)?;
            json.push('\n');
            write_text(args.output.as_deref(), &json)?;
        }
        MergeFormat::Seed => {
            let document = SeedDocument::build(&plan.index(), &args.name, &args.caches);
            let mut json = serde_json::to_string_pretty(&document)?;
            json.push('\n');
            write_text(args.output.as_deref(), &json)?;
        }
    }

    if let Some(ref path) = args.output {
        tracing::info!("wrote {} boxes to {}", boxes.len(), path.display());
    }
    Ok(())
}
