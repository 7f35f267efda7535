//! Error types for Chartseed

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartseedError {
    // Work directory errors
    #[error("Work directory {path} does not exist")]
    WorkDirMissing { path: PathBuf },

    // Box input errors
    #[error("Invalid box line '{line}': {reason}")]
    InvalidBoxLine { line: String, reason: String },

    #[error("Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    #[error("Number of tiles {count} larger than allowed {allowed}")]
    TooManyTiles { count: u64, allowed: u64 },

    // Process control errors
    #[error("Unable to stop seed process {pid}")]
    UnableToStop { pid: u32 },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChartseedError {
    fn from(err: serde_json::Error) -> Self {
        ChartseedError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChartseedError>;
