//! Chartseed Seed
//!
//! Seed configuration writer and the supervisor that runs the external
//! seed process in the background, with pause, resume and restart after a
//! crash of the host.

pub mod paths;
pub mod process;
pub mod supervisor;
pub mod worker;
pub mod writer;

pub use paths::SeedPaths;
pub use process::{OsLauncher, ProcessLauncher, WorkerCommand, WorkerHandle};
pub use supervisor::{SeedSupervisor, SupervisorOptions, WorkerProgram, PARENT_PID_ENV};
pub use worker::{run_worker, WorkerArgs};
pub use writer::{Coverage, SeedDocument, SeedEntry};
