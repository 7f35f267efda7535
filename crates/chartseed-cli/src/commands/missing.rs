//! Missing command implementation

use crate::cli::{ConfigArgs, MissingArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::MissingOutput;
use anyhow::{Context, Result};
use chartseed_core::config::CliConfigOverrides;
use chartseed_geo::pyramid::compute_missing;
use chartseed_geo::BoxDatabase;

pub fn execute(args: MissingArgs, config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides { max_empty: args.max_empty, ..Default::default() };
    let config = load_config(config_args, overrides)?;

    let boxes = BoxDatabase::new(&args.input)
        .read_boxes()
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let input_boxes = boxes.len();

    let created = compute_missing(boxes, config.max_empty.value);
    BoxDatabase::write_boxes(&args.output, &created)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if output.is_json() {
        output.result(MissingOutput {
            input_boxes,
            created_boxes: created.len(),
            output: args.output.display().to_string(),
        })?;
    } else {
        output.success(format!(
            "wrote {} boxes for {} input boxes to {}",
            created.len(),
            input_boxes,
            args.output.display()
        ));
    }
    Ok(())
}
