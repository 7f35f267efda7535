//! Chartseed Core - Domain models, errors, and configuration
//!
//! This crate contains the box algebra value types and the shared error and
//! configuration layers used by the geometry and seeding crates.

pub mod config;
pub mod error;
pub mod models;

pub use error::{ChartseedError, Result};
