//! Seed command implementation
//!
//! `seed run` and `seed resume` own the supervisor for the lifetime of the
//! seed and poll it until the worker exits. Ctrl-C pauses the seed so a
//! later `seed resume` continues from the progress file.

use super::read_selection;
use crate::cli::{ConfigArgs, SeedArgs, SeedCommands, SeedLogArgs, SeedRunArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::SeedRunOutput;
use crate::progress::{create_spinner, finish_error, finish_success, hidden_spinner};
use anyhow::{bail, Context, Result};
use chartseed_core::config::{CliConfigOverrides, LayeredConfig};
use chartseed_core::models::{SeedState, SeedStatus, StartOutcome};
use chartseed_geo::{plan_seed, BoxDatabase, PlanOptions};
use chartseed_seed::{SeedSupervisor, SupervisorOptions, WorkerProgram};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

pub async fn execute(args: SeedArgs, config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    match args.command {
        SeedCommands::Run(run_args) => run(run_args, config_args, output).await,
        SeedCommands::Resume => resume(config_args, output).await,
        SeedCommands::Status => status(config_args, output),
        SeedCommands::Stop => stop(config_args, output),
        SeedCommands::Log(log_args) => print_log(log_args, config_args, output),
    }
}

fn open_supervisor(config: &LayeredConfig) -> Result<SeedSupervisor> {
    let work_dir = &config.work_dir.value;
    fs::create_dir_all(work_dir)
        .with_context(|| format!("Failed to create work directory {}", work_dir.display()))?;

    let options = SupervisorOptions {
        work_dir: work_dir.clone(),
        tile_config: config.tile_config.value.clone(),
        seed_command: config.seed_command.value.clone(),
        worker: WorkerProgram::current_exe()?,
        keep_logs: config.keep_logs.value,
    };
    Ok(SeedSupervisor::open(options)?)
}

fn poll_interval(config: &LayeredConfig) -> Duration {
    Duration::from_millis(config.poll_interval_ms.value.max(1))
}

async fn run(args: SeedRunArgs, config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides {
        min_zoom: args.zoom.min_zoom,
        max_zoom: args.zoom.max_zoom,
        max_tiles: args.max_tiles,
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

    if plan.merged.is_empty() {
        bail!("Selection does not overlap any box in {}", db.path().display());
    }
    plan.check_budget(config.max_tiles.value)?;

    let name = args.name.or_else(|| {
        args.selection.file_stem().map(|stem| stem.to_string_lossy().into_owned())
    });

    let supervisor = Arc::new(open_supervisor(&config)?);
    match supervisor.run_seed(&plan.boxes(), args.caches, name)? {
        StartOutcome::Started => {}
        StartOutcome::Rejected(reason) => bail!("Seed not started: {}", reason),
    }
    output.info(format!(
        "seeding {} boxes with {} tiles",
        plan.merged.len() + plan.synthesized.len(),
        plan.total_tiles()
    ));

    let status = watch(&supervisor, poll_interval(&config), output).await?;
    report(status, Some(plan.total_tiles()), output)
}

async fn resume(config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(config_args, CliConfigOverrides::default())?;
    let supervisor = Arc::new(open_supervisor(&config)?);

    if !supervisor.check_restart()? {
        output.info("No interrupted seed to resume");
        return Ok(());
    }
    output.info(format!("resumed seed {}", supervisor.status().selection.unwrap_or_default()));

    let status = watch(&supervisor, poll_interval(&config), output).await?;
    report(status, None, output)
}

/// Poll until the worker exits; Ctrl-C pauses the seed
async fn watch(
    supervisor: &Arc<SeedSupervisor>,
    interval: Duration,
    output: &OutputWriter,
) -> Result<SeedStatus> {
    let spinner = if output.is_json() { hidden_spinner() } else { create_spinner("seeding") };
    let mut ticker = tokio::time::interval(interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !supervisor.check_running()? {
                    break;
                }
                spinner.set_message(supervisor.status().info);
            }
            signal = &mut ctrl_c => {
                signal.context("Failed to listen for Ctrl-C")?;
                spinner.set_message("pausing seed");
                let pausing = Arc::clone(supervisor);
                tokio::task::spawn_blocking(move || pausing.kill_run(true))
                    .await
                    .context("Pause task failed")??;
                break;
            }
        }
    }

    let status = supervisor.status();
    if status.status == SeedState::Error {
        finish_error(&spinner, &status.info);
    } else {
        finish_success(&spinner, &status.info);
    }
    Ok(status)
}

fn report(status: SeedStatus, num_tiles: Option<u64>, output: &OutputWriter) -> Result<()> {
    let failed = status.status == SeedState::Error;
    let info = status.info.clone();

    if output.is_json() {
        output.result(SeedRunOutput { started: true, num_tiles, status })?;
    } else {
        print_status(&status, output);
        if status.paused {
            output.info("Continue with 'chartseed seed resume'");
        }
    }

    if failed {
        bail!("Seed failed: {}", info);
    }
    Ok(())
}

fn print_status(status: &SeedStatus, output: &OutputWriter) {
    output.section("Seed Status");
    output.kv("Status", status.status);
    output.kv("Info", &status.info);
    output.kv("Paused", status.paused);
    if let Some(ref selection) = status.selection {
        output.kv("Selection", selection);
    }
    if !status.caches.is_empty() {
        output.kv("Caches", status.caches.join(", "));
    }
    if let Some(ref log_file) = status.log_file {
        output.kv("Log", log_file);
    }
}

/// State of the work directory as seen by a fresh supervisor
fn status(config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(config_args, CliConfigOverrides::default())?;
    let supervisor = open_supervisor(&config)?;

    let mut status = supervisor.status();
    if status.log_file.is_none() {
        status.log_file = supervisor.paths().list_logs()?.pop();
    }

    if output.is_json() {
        output.result(status)?;
    } else {
        print_status(&status, output);
    }
    Ok(())
}

fn stop(config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(config_args, CliConfigOverrides::default())?;
    let supervisor = open_supervisor(&config)?;

    if !supervisor.status().paused {
        output.info("No paused seed to stop");
        return Ok(());
    }
    supervisor.kill_run(false)?;
    output.success(supervisor.status().info);
    Ok(())
}

fn print_log(args: SeedLogArgs, config_args: &ConfigArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(config_args, CliConfigOverrides::default())?;
    let supervisor = open_supervisor(&config)?;

    let name = match args.name {
        Some(name) => name,
        None => match supervisor.paths().list_logs()?.pop() {
            Some(name) => name,
            None => {
                output.info("No seed logs yet");
                return Ok(());
            }
        },
    };

    let Some(mut file) = supervisor.open_log(&name, args.tail)? else {
        bail!("Unknown seed log {}", name);
    };
    std::io::copy(&mut file, &mut std::io::stdout().lock())?;
    Ok(())
}
