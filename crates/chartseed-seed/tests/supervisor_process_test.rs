//! Supervisor tests against real shell workers
#![cfg(unix)]

use chartseed_core::models::{RejectReason, SeedState, StartOutcome, ZoomBox};
use chartseed_seed::{SeedSupervisor, SupervisorOptions, WorkerProgram};
use std::io::Read;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn shell_supervisor(dir: &TempDir, script: &str) -> SeedSupervisor {
    let options = SupervisorOptions {
        work_dir: dir.path().to_path_buf(),
        tile_config: PathBuf::from("mapproxy.yaml"),
        seed_command: "mapproxy-seed".to_string(),
        worker: WorkerProgram {
            program: PathBuf::from("sh"),
            leading_args: vec!["-c".to_string(), script.to_string(), "worker".to_string()],
        },
        keep_logs: 5,
    };
    SeedSupervisor::open(options).unwrap()
}

fn boxes() -> Vec<ZoomBox> {
    vec![ZoomBox::from_edges(54.0, 10.0, 54.5, 10.5, 12).with_name("DE1")]
}

fn wait_finished(sup: &SeedSupervisor) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while sup.check_running().unwrap() {
        assert!(Instant::now() < deadline, "worker did not finish");
        thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn test_worker_runs_to_completion() {
    let dir = TempDir::new().unwrap();
    let sup = shell_supervisor(&dir, "echo seeding \"$@\"; echo parent=$CHARTSEED_PARENT_PID");

    let outcome = sup.run_seed(&boxes(), vec!["osm".to_string()], Some("north".to_string()));
    assert_eq!(outcome.unwrap(), StartOutcome::Started);
    wait_finished(&sup);

    let status = sup.status();
    assert_eq!(status.status, SeedState::Ok);
    assert!(sup.paths().last_config().exists());

    let mut log = String::new();
    let name = status.log_file.unwrap();
    sup.open_log(&name, None).unwrap().unwrap().read_to_string(&mut log).unwrap();
    assert!(log.contains("seeding -s"));
    assert!(log.contains("--progress-file"));
    assert!(log.contains(&format!("parent={}", std::process::id())));
}

#[test]
fn test_failing_worker() {
    let dir = TempDir::new().unwrap();
    let sup = shell_supervisor(&dir, "exit 3");

    sup.run_seed(&boxes(), vec![], None).unwrap();
    wait_finished(&sup);

    let status = sup.status();
    assert_eq!(status.status, SeedState::Error);
    assert!(status.info.contains("state 3"));
}

#[test]
fn test_running_worker_blocks_second_start() {
    let dir = TempDir::new().unwrap();
    let sup = shell_supervisor(&dir, "sleep 10");

    assert!(sup.run_seed(&boxes(), vec![], None).unwrap().is_started());
    assert_eq!(
        sup.run_seed(&boxes(), vec![], None).unwrap(),
        StartOutcome::Rejected(RejectReason::AlreadyRunning)
    );

    assert!(sup.kill_run(false).unwrap());
    assert_eq!(sup.status().status, SeedState::Error);
}

#[test]
fn test_pause_then_resume_in_new_supervisor() {
    let dir = TempDir::new().unwrap();
    {
        let sup = shell_supervisor(&dir, "sleep 10");
        sup.run_seed(&boxes(), vec!["osm".to_string()], Some("north".to_string())).unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(sup.kill_run(true).unwrap());
        assert!(sup.status().paused);
    }

    let sup = shell_supervisor(&dir, "exit 0");
    assert!(sup.status().paused);
    assert!(sup.check_restart().unwrap());
    wait_finished(&sup);

    let status = sup.status();
    assert_eq!(status.status, SeedState::Ok);
    assert_eq!(status.selection.as_deref(), Some("north"));
    assert_eq!(status.caches, vec!["osm".to_string()]);
    assert!(!sup.paths().has_current_config());
}
