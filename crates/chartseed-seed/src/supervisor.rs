//! Seed job supervisor.
//!
//! Owns one work directory and at most one worker. The caller polls
//! [`SeedSupervisor::check_running`] to observe completion; there is no
//! completion callback. Only the start of a worker is serialized against
//! concurrent starts, all other state changes happen under the same short
//! lived lock.

use crate::paths::SeedPaths;
use crate::process::{OsLauncher, ProcessLauncher, WorkerCommand, WorkerHandle};
use crate::worker::WorkerArgs;
use crate::writer::SeedDocument;
use chartseed_core::models::{RejectReason, SeedInfo, SeedState, SeedStatus, StartOutcome, ZoomBox};
use chartseed_core::{ChartseedError, Result};
use chartseed_geo::ZoomIndex;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Environment variable carrying the supervisor pid to the worker
pub const PARENT_PID_ENV: &str = "CHARTSEED_PARENT_PID";

const KILL_POLL_ATTEMPTS: u32 = 10;
const KILL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Program started as worker; the worker arguments follow `leading_args`
#[derive(Debug, Clone)]
pub struct WorkerProgram {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
}

impl WorkerProgram {
    /// The running executable with its `worker` subcommand
    pub fn current_exe() -> Result<Self> {
        Ok(Self { program: std::env::current_exe()?, leading_args: vec!["worker".to_string()] })
    }
}

#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub work_dir: PathBuf,
    /// Tile server configuration handed to the seed command
    pub tile_config: PathBuf,
    pub seed_command: String,
    pub worker: WorkerProgram,
    pub keep_logs: usize,
}

#[derive(Default)]
struct State {
    child: Option<Box<dyn WorkerHandle>>,
    starting: bool,
    status: SeedState,
    info: String,
    caches: Vec<String>,
    selection: Option<String>,
    paused: bool,
    current_log: Option<PathBuf>,
}

/// Runs one seed at a time in a background worker process
pub struct SeedSupervisor<L: ProcessLauncher = OsLauncher> {
    paths: SeedPaths,
    options: SupervisorOptions,
    launcher: L,
    state: Mutex<State>,
}

impl SeedSupervisor<OsLauncher> {
    pub fn open(options: SupervisorOptions) -> Result<Self> {
        Self::with_launcher(options, OsLauncher)
    }
}

impl<L: ProcessLauncher> SeedSupervisor<L> {
    /// Open the work directory.
    ///
    /// A seed config left from an earlier process means an interrupted seed:
    /// the supervisor starts paused with that seed's metadata until
    /// [`check_restart`](Self::check_restart) resumes it.
    pub fn with_launcher(options: SupervisorOptions, launcher: L) -> Result<Self> {
        let paths = SeedPaths::new(&options.work_dir)?;

        let mut state = State::default();
        if paths.has_current_config() {
            let info = paths.read_info();
            tracing::info!(
                "found interrupted seed {:?} in {}",
                info.selection,
                paths.work_dir().display()
            );
            state.paused = true;
            state.info = "seed paused".to_string();
            state.caches = info.caches;
            state.selection = info.selection;
        }

        Ok(Self { paths, options, launcher, state: Mutex::new(state) })
    }

    pub fn paths(&self) -> &SeedPaths {
        &self.paths
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a seed for `boxes`.
    ///
    /// Rejected while a worker is alive or being started, or while paused.
    pub fn run_seed(
        &self,
        boxes: &[ZoomBox],
        caches: Vec<String>,
        selection: Option<String>,
    ) -> Result<StartOutcome> {
        if self.check_running()? {
            return Ok(StartOutcome::Rejected(RejectReason::AlreadyRunning));
        }

        let prefix = selection.clone().unwrap_or_else(|| "seed".to_string());
        let index = ZoomIndex::from_boxes(boxes.to_vec());
        let document = SeedDocument::build(&index, &prefix, &caches);
        self.start(Some(&document), SeedInfo { selection, caches }, false)
    }

    /// With `resume` the pause flag is ignored and cleared once the worker
    /// is up.
    fn start(
        &self,
        document: Option<&SeedDocument>,
        info: SeedInfo,
        resume: bool,
    ) -> Result<StartOutcome> {
        {
            let mut state = self.lock();
            if state.paused && !resume {
                return Ok(StartOutcome::Rejected(RejectReason::Paused));
            }
            if state.starting || state.child.is_some() {
                return Ok(StartOutcome::Rejected(RejectReason::AlreadyRunning));
            }
            state.starting = true;
        }

        let launched = self.launch(document, &info);

        let mut state = self.lock();
        state.starting = false;
        let (child, log) = launched?;

        tracing::info!("started seed {:?} for caches {:?}", info.selection, info.caches);
        state.child = Some(child);
        state.paused = false;
        state.status = SeedState::Running;
        state.info = format!("started at {}", timestamp());
        state.caches = info.caches;
        state.selection = info.selection;
        state.current_log = Some(log);
        Ok(StartOutcome::Started)
    }

    fn launch(
        &self,
        document: Option<&SeedDocument>,
        info: &SeedInfo,
    ) -> Result<(Box<dyn WorkerHandle>, PathBuf)> {
        if let Some(document) = document {
            document.write(self.paths.current_config())?;
        }

        let log_file = self.paths.new_log_file();
        let command = self.worker_command(log_file.clone());
        let child = self.launcher.spawn(&command)?;

        if let Err(e) = self.paths.write_info(info) {
            tracing::warn!("unable to write seed info: {}", e);
        }
        Ok((child, log_file))
    }

    fn worker_command(&self, log_file: PathBuf) -> WorkerCommand {
        let worker_args = WorkerArgs {
            seed_file: self.paths.current_config(),
            tile_config: self.options.tile_config.clone(),
            concurrency: 1,
            progress_file: self.paths.progress_file(),
            continue_seed: true,
            command: self.options.seed_command.clone(),
        };

        let mut args = self.options.worker.leading_args.clone();
        args.extend(worker_args.worker_args());

        WorkerCommand {
            program: self.options.worker.program.clone(),
            args,
            env: vec![(PARENT_PID_ENV.to_string(), std::process::id().to_string())],
            log_file,
        }
    }

    /// Poll the worker; returns whether it is still alive.
    ///
    /// A finished worker moves the job to OK or ERROR and retires its files,
    /// unless paused, in which case the files stay for a later resume.
    pub fn check_running(&self) -> Result<bool> {
        let mut state = self.lock();
        let Some(child) = state.child.as_mut() else {
            return Ok(false);
        };
        let Some(code) = child.try_wait()? else {
            return Ok(true);
        };
        state.child = None;

        if state.paused {
            tracing::info!("seed paused");
            state.status = SeedState::Inactive;
            state.info = "seed paused".to_string();
        } else {
            tracing::info!("seed finished with status {}", code);
            self.paths.cleanup_files();
            if code == 0 {
                state.status = SeedState::Ok;
                state.info = format!("seed finished at {}", timestamp());
            } else {
                state.status = SeedState::Error;
                state.info = format!("seed returned with state {} at {}", code, timestamp());
            }
        }
        drop(state);

        if let Err(e) = self.paths.prune_logs(self.options.keep_logs) {
            tracing::warn!("unable to prune seed logs: {}", e);
        }
        Ok(false)
    }

    /// Interrupt the worker and wait briefly for it to exit.
    ///
    /// With `set_paused` the seed config stays for a later resume. Without a
    /// worker, a paused seed is discarded instead. Returns whether a worker
    /// was stopped; a worker outliving the wait is an error and the job
    /// stays RUNNING.
    pub fn kill_run(&self, set_paused: bool) -> Result<bool> {
        let mut state = self.lock();
        let running = match state.child.as_mut() {
            Some(child) => {
                child.interrupt_group()?;
                Some(child.id())
            }
            None => None,
        };
        let Some(pid) = running else {
            if state.paused && !set_paused {
                tracing::info!("discarding paused seed");
                self.paths.cleanup_files();
                state.paused = false;
                state.info = "seed stopped while paused".to_string();
            }
            return Ok(false);
        };
        state.paused = set_paused;
        drop(state);

        for _ in 0..KILL_POLL_ATTEMPTS {
            if !self.check_running()? {
                return Ok(true);
            }
            thread::sleep(KILL_POLL_INTERVAL);
        }

        tracing::error!("seed worker {} did not stop", pid);
        Err(ChartseedError::UnableToStop { pid })
    }

    /// Resume a seed whose config is still on disk.
    ///
    /// Clears the pause flag once the worker runs; a failed launch leaves
    /// the seed paused. Without a config, a stale progress file is removed.
    /// Returns whether a worker was started.
    pub fn check_restart(&self) -> Result<bool> {
        {
            let state = self.lock();
            if state.child.is_some() || state.starting {
                return Ok(false);
            }
        }

        if !self.paths.has_current_config() {
            self.lock().paused = false;
            self.paths.remove_progress();
            return Ok(false);
        }

        let info = self.paths.read_info();
        tracing::info!("restarting seed {:?}", info.selection);
        Ok(self.start(None, info, true)?.is_started())
    }

    /// Best-effort snapshot of the job state
    pub fn status(&self) -> SeedStatus {
        let state = self.lock();
        SeedStatus {
            status: state.status,
            info: state.info.clone(),
            caches: state.caches.clone(),
            selection: state.selection.clone(),
            paused: state.paused,
            log_file: state
                .current_log
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
        }
    }

    /// Open a retained log positioned `bytes_from_end` before its end
    pub fn open_log(&self, name: &str, bytes_from_end: Option<u64>) -> Result<Option<File>> {
        let Some(mut file) = self.paths.find_log(name)? else {
            return Ok(None);
        };
        if let Some(back) = bytes_from_end {
            let size = file.metadata()?.len();
            file.seek(SeekFrom::Start(size - back.min(size)))?;
        }
        Ok(Some(file))
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}
