//! Seed job records shared between the supervisor and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the seed job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeedState {
    /// No worker and no finished run
    #[default]
    Inactive,
    /// A worker process is alive
    Running,
    /// The last worker exited with status 0
    Ok,
    /// The last worker exited with a non-zero status
    Error,
}

impl fmt::Display for SeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeedState::Inactive => "inactive",
            SeedState::Running => "running",
            SeedState::Ok => "ok",
            SeedState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of the seed job as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeedStatus {
    pub status: SeedState,
    pub info: String,
    pub caches: Vec<String>,
    pub selection: Option<String>,
    pub paused: bool,
    pub log_file: Option<String>,
}

/// Metadata persisted next to a running seed so a restarted supervisor can
/// describe and resume it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeedInfo {
    #[serde(default)]
    pub selection: Option<String>,
    #[serde(default)]
    pub caches: Vec<String>,
}

/// Why a start request was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    AlreadyRunning,
    Paused,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::AlreadyRunning => f.write_str("another seed is already running"),
            RejectReason::Paused => f.write_str("cannot start a new seed while paused"),
        }
    }
}

/// Result of asking the supervisor to start a seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    Rejected(RejectReason),
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_string(&SeedState::Running).unwrap();
        assert_eq!(json, "\"running\"");
        assert_eq!(SeedState::Error.to_string(), "error");
    }

    #[test]
    fn test_info_tolerates_missing_fields() {
        let info: SeedInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info, SeedInfo::default());

        let info: SeedInfo =
            serde_json::from_str(r#"{"selection": "baltic", "caches": ["osm"]}"#).unwrap();
        assert_eq!(info.selection.as_deref(), Some("baltic"));
        assert_eq!(info.caches, vec!["osm".to_string()]);
    }

    #[test]
    fn test_reject_messages() {
        assert_eq!(RejectReason::AlreadyRunning.to_string(), "another seed is already running");
        assert!(!StartOutcome::Rejected(RejectReason::Paused).is_started());
    }
}
