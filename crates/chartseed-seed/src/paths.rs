//! File layout of a seed work directory.

use chartseed_core::models::SeedInfo;
use chartseed_core::{ChartseedError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

pub const CURRENT_CONFIG: &str = "seed.json";
pub const LAST_CONFIG: &str = "last_seed.json";
pub const PROGRESS_FILE: &str = "progress";
pub const INFO_FILE: &str = "info.json";
pub const LOG_PREFIX: &str = "seed.log";

/// Well-known paths inside one work directory
#[derive(Debug, Clone)]
pub struct SeedPaths {
    work_dir: PathBuf,
}

impl SeedPaths {
    /// The directory must already exist
    pub fn new(work_dir: impl Into<PathBuf>) -> Result<Self> {
        let work_dir = work_dir.into();
        if !work_dir.is_dir() {
            return Err(ChartseedError::WorkDirMissing { path: work_dir });
        }
        Ok(Self { work_dir })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn current_config(&self) -> PathBuf {
        self.work_dir.join(CURRENT_CONFIG)
    }

    pub fn last_config(&self) -> PathBuf {
        self.work_dir.join(LAST_CONFIG)
    }

    pub fn progress_file(&self) -> PathBuf {
        self.work_dir.join(PROGRESS_FILE)
    }

    pub fn info_file(&self) -> PathBuf {
        self.work_dir.join(INFO_FILE)
    }

    pub fn has_current_config(&self) -> bool {
        self.current_config().is_file()
    }

    /// A log file name not used before
    pub fn new_log_file(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.6f");
        let base = format!("{}.{}", LOG_PREFIX, stamp);

        let mut path = self.work_dir.join(&base);
        let mut n = 1;
        while path.exists() {
            path = self.work_dir.join(format!("{}-{}", base, n));
            n += 1;
        }
        path
    }

    /// Names of all log files, oldest first
    pub fn list_logs(&self) -> Result<Vec<String>> {
        let prefix = format!("{}.", LOG_PREFIX);
        let mut logs = Vec::new();
        for entry in fs::read_dir(&self.work_dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) {
                logs.push(name);
            }
        }
        logs.sort();
        Ok(logs)
    }

    /// Remove all but the newest `keep` log files; returns the number removed
    pub fn prune_logs(&self, keep: usize) -> Result<usize> {
        let logs = self.list_logs()?;
        let excess = logs.len().saturating_sub(keep);

        let mut removed = 0;
        for name in &logs[..excess] {
            let path = self.work_dir.join(name);
            tracing::info!("removing seed log {}", path.display());
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("unable to remove {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }

    /// Open a log file by name, `None` if it is not one of our logs
    pub fn find_log(&self, name: &str) -> Result<Option<File>> {
        if !self.list_logs()?.iter().any(|log| log == name) {
            return Ok(None);
        }
        Ok(Some(File::open(self.work_dir.join(name))?))
    }

    pub fn write_info(&self, info: &SeedInfo) -> Result<()> {
        fs::write(self.info_file(), serde_json::to_vec_pretty(info)?)?;
        Ok(())
    }

    /// Info of the current seed; a missing or unreadable file yields defaults
    pub fn read_info(&self) -> SeedInfo {
        let content = match fs::read(self.info_file()) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("no seed info: {}", e);
                return SeedInfo::default();
            }
        };
        serde_json::from_slice(&content).unwrap_or_else(|e| {
            tracing::warn!("invalid seed info file: {}", e);
            SeedInfo::default()
        })
    }

    /// Retire a finished seed: keep its config as `last_seed`, drop the rest
    pub fn cleanup_files(&self) {
        if let Err(e) = fs::rename(self.current_config(), self.last_config()) {
            log_remove_error(&self.current_config(), e);
        }
        remove_quietly(&self.current_config());
        self.remove_progress();
        remove_quietly(&self.info_file());
    }

    pub fn remove_progress(&self) {
        remove_quietly(&self.progress_file());
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log_remove_error(path, e);
    }
}

fn log_remove_error(path: &Path, e: io::Error) {
    if e.kind() != io::ErrorKind::NotFound {
        tracing::warn!("unable to remove {}: {}", path.display(), e);
    }
}
