//! Coalesce command implementation

use super::write_text;
use crate::cli::CoalesceArgs;
use crate::output::OutputWriter;
use crate::output_types::CoalesceOutput;
use anyhow::{Context, Result};
use chartseed_geo::database::to_line;
use chartseed_geo::{BoxDatabase, Coalescer};

pub fn execute(args: CoalesceArgs, output: &OutputWriter) -> Result<()> {
    let boxes = BoxDatabase::new(&args.input)
        .read_boxes()
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let input_boxes = boxes.len();

    let combined = Coalescer::new(args.tolerance).coalesce(boxes);

    let mut lines = String::new();
    for b in &combined {
        lines.push_str(&to_line(b));
        lines.push('\n');
    }

    match args.output {
        Some(ref path) => {
            write_text(Some(path.as_path()), &lines)?;
            let result = CoalesceOutput { input_boxes, output_boxes: combined.len() };
            if output.is_json() {
                output.result(result)?;
            } else {
                output.success(format!(
                    "combined {} boxes into {} in {}",
                    result.input_boxes,
                    result.output_boxes,
                    path.display()
                ));
            }
        }
        None => write_text(None, &lines)?,
    }
    Ok(())
}
