//! Worker entry point, started by the seed supervisor

use crate::cli::WorkerCliArgs;
use anyhow::{Context, Result};
use chartseed_seed::{run_worker, WorkerArgs, PARENT_PID_ENV};

pub fn execute(args: WorkerCliArgs) -> Result<()> {
    let parent_pid = match std::env::var(PARENT_PID_ENV) {
        Ok(raw) => Some(
            raw.trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid {} value '{}'", PARENT_PID_ENV, raw))?,
        ),
        Err(_) => None,
    };

    let worker_args = WorkerArgs {
        seed_file: args.seed,
        tile_config: args.tile_file,
        concurrency: args.concurrency,
        progress_file: args.progress_file,
        continue_seed: args.continue_seed,
        command: args.command,
    };

    let code = run_worker(&worker_args, parent_pid).context("Seed command failed to run")?;
    std::process::exit(code);
}
