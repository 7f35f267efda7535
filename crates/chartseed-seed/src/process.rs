//! Platform layer for worker processes.
//!
//! The supervisor only sees [`ProcessLauncher`] and [`WorkerHandle`]; the OS
//! implementation starts every worker as the leader of a new process group
//! so an interrupt reaches the worker and everything it spawned.

use chartseed_core::Result;
use std::fs::File;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Everything needed to start one worker
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Receives stdout and stderr of the worker
    pub log_file: PathBuf,
}

/// A started worker
pub trait WorkerHandle: Send {
    fn id(&self) -> u32;

    /// Exit code once the worker has finished
    fn try_wait(&mut self) -> Result<Option<i32>>;

    /// Send an interrupt to the worker's whole process group
    fn interrupt_group(&mut self) -> Result<()>;
}

/// Starts workers
pub trait ProcessLauncher: Send + Sync {
    fn spawn(&self, command: &WorkerCommand) -> Result<Box<dyn WorkerHandle>>;
}

/// Launches real OS processes
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLauncher;

impl ProcessLauncher for OsLauncher {
    fn spawn(&self, command: &WorkerCommand) -> Result<Box<dyn WorkerHandle>> {
        let log = File::create(&command.log_file)?;

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(log.try_clone()?)
            .stderr(log);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn()?;
        tracing::info!(
            "started worker {} ({}), logging to {}",
            child.id(),
            command.program.display(),
            command.log_file.display()
        );
        Ok(Box::new(OsHandle { child }))
    }
}

struct OsHandle {
    child: Child,
}

impl WorkerHandle for OsHandle {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn try_wait(&mut self) -> Result<Option<i32>> {
        Ok(self.child.try_wait()?.map(exit_code))
    }

    #[cfg(unix)]
    fn interrupt_group(&mut self) -> Result<()> {
        // The worker leads its own group, so its pid is the group id
        interrupt_process_group(self.child.id())
    }

    #[cfg(not(unix))]
    fn interrupt_group(&mut self) -> Result<()> {
        Ok(self.child.kill()?)
    }
}

/// Exit code of a finished process; signal deaths map to `128 + signal`
pub fn exit_code(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(-1)
}

/// Send SIGINT to the process group `pgid`
#[cfg(unix)]
pub fn interrupt_process_group(pgid: u32) -> Result<()> {
    // SAFETY: killpg has no memory safety requirements
    let rc = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGINT) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

/// Send SIGINT to the process group of the calling process
#[cfg(unix)]
pub fn interrupt_own_group() -> Result<()> {
    // SAFETY: getpgrp cannot fail
    let pgid = unsafe { libc::getpgrp() };
    interrupt_process_group(pgid as u32)
}

#[cfg(not(unix))]
pub fn interrupt_own_group() -> Result<()> {
    Ok(())
}

/// Check whether a process with `pid` exists
#[cfg(unix)]
pub fn process_alive(pid: u32) -> bool {
    // SAFETY: signal 0 only performs the permission and existence check
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub fn process_alive(_pid: u32) -> bool {
    true
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn wait(handle: &mut dyn WorkerHandle) -> i32 {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(code) = handle.try_wait().unwrap() {
                return code;
            }
            assert!(Instant::now() < deadline, "worker did not exit");
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    fn shell(dir: &TempDir, script: &str) -> WorkerCommand {
        WorkerCommand {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string()],
            env: vec![("CHARTSEED_TEST_VALUE".to_string(), "42".to_string())],
            log_file: dir.path().join("worker.log"),
        }
    }

    #[test]
    fn test_output_goes_to_log() {
        let dir = TempDir::new().unwrap();
        let command = shell(&dir, "echo value=$CHARTSEED_TEST_VALUE; echo oops >&2; exit 3");

        let mut handle = OsLauncher.spawn(&command).unwrap();

        assert_eq!(wait(handle.as_mut()), 3);
        let log = std::fs::read_to_string(&command.log_file).unwrap();
        assert!(log.contains("value=42"));
        assert!(log.contains("oops"));
    }

    #[test]
    fn test_interrupt_reaches_the_group() {
        let dir = TempDir::new().unwrap();
        let command = shell(&dir, "sleep 10; exit 0");

        let mut handle = OsLauncher.spawn(&command).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        handle.interrupt_group().unwrap();

        assert_ne!(wait(handle.as_mut()), 0);
    }

    #[test]
    fn test_process_alive() {
        assert!(process_alive(std::process::id()));
        assert!(!process_alive(i32::MAX as u32));
    }
}
