//! Worker entry point.
//!
//! The worker runs the external seed command and watches the supervisor. If
//! the supervisor disappears, the worker interrupts its own process group so
//! no seed keeps running unattended.

use crate::process::{exit_code, interrupt_own_group, process_alive};
use chartseed_core::{ChartseedError, Result};
use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Poll interval for the seed command and the parent check
pub const WATCH_INTERVAL: Duration = Duration::from_millis(500);

/// Arguments of a worker run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerArgs {
    pub seed_file: PathBuf,
    pub tile_config: PathBuf,
    pub concurrency: u32,
    pub progress_file: PathBuf,
    pub continue_seed: bool,
    /// Seed command, split on whitespace into program and leading arguments
    pub command: String,
}

impl WorkerArgs {
    /// Arguments handed to the seed command
    pub fn seed_args(&self) -> Vec<String> {
        let mut args = vec![
            "-s".to_string(),
            self.seed_file.display().to_string(),
            "-f".to_string(),
            self.tile_config.display().to_string(),
            "-c".to_string(),
            self.concurrency.to_string(),
            "--progress-file".to_string(),
            self.progress_file.display().to_string(),
        ];
        if self.continue_seed {
            args.push("--continue".to_string());
        }
        args
    }

    /// Arguments for the `worker` subcommand that recreate these args
    pub fn worker_args(&self) -> Vec<String> {
        let mut args = self.seed_args();
        args.push("--command".to_string());
        args.push(self.command.clone());
        args
    }
}

/// Run the seed command to completion and return its exit code.
///
/// With a `parent_pid` the worker checks every [`WATCH_INTERVAL`] that the
/// parent still exists and stops the whole group with exit code 1 if not.
pub fn run_worker(args: &WorkerArgs, parent_pid: Option<u32>) -> Result<i32> {
    let mut parts = args.command.split_whitespace();
    let program = parts.next().ok_or_else(|| ChartseedError::ConfigInvalid {
        key: "seed_command".to_string(),
        reason: "empty command".to_string(),
    })?;

    let mut child = Command::new(program).args(parts).args(args.seed_args()).spawn()?;
    tracing::info!("started {} as {}", program, child.id());

    if let Some(pid) = parent_pid {
        tracing::info!("start checking parent pid {}", pid);
    }

    loop {
        if let Some(status) = child.try_wait()? {
            let code = exit_code(status);
            tracing::info!("seed command stopped with {}, exiting", code);
            return Ok(code);
        }

        if let Some(pid) = parent_pid {
            if !process_alive(pid) {
                tracing::warn!("parent pid {} not available any more, stopping", pid);
                interrupt_own_group()?;
                return Ok(1);
            }
        }

        thread::sleep(WATCH_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &str) -> WorkerArgs {
        WorkerArgs {
            seed_file: PathBuf::from("/work/seed.json"),
            tile_config: PathBuf::from("/etc/mapproxy.yaml"),
            concurrency: 1,
            progress_file: PathBuf::from("/work/progress"),
            continue_seed: true,
            command: command.to_string(),
        }
    }

    #[test]
    fn test_seed_args() {
        assert_eq!(
            args("mapproxy-seed").seed_args(),
            vec![
                "-s",
                "/work/seed.json",
                "-f",
                "/etc/mapproxy.yaml",
                "-c",
                "1",
                "--progress-file",
                "/work/progress",
                "--continue"
            ]
        );

        let mut fresh = args("mapproxy-seed");
        fresh.continue_seed = false;
        assert!(!fresh.seed_args().contains(&"--continue".to_string()));
    }

    #[test]
    fn test_worker_args_carry_the_command() {
        let worker = args("python3 -m mapproxy.seed").worker_args();
        assert_eq!(&worker[worker.len() - 2..], ["--command", "python3 -m mapproxy.seed"]);
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(matches!(
            run_worker(&args("  "), None),
            Err(ChartseedError::ConfigInvalid { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_is_passed_through() {
        assert_eq!(run_worker(&args("true"), None).unwrap(), 0);
        assert_eq!(run_worker(&args("false"), Some(std::process::id())).unwrap(), 1);
    }
}
