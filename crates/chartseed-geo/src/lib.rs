//! Chartseed Geo - Box algebra, tile math, and coverage planning
//!
//! This crate turns a chart box database and a selection into the set of
//! boxes a seed job has to render: merging against the selection, filling
//! zoom pyramid gaps, and coalescing the result.

pub mod coalesce;
pub mod database;
pub mod export;
pub mod index;
pub mod merge;
pub mod models;
pub mod plan;
pub mod pyramid;
pub mod tiles;

pub use coalesce::Coalescer;
pub use database::BoxDatabase;
pub use index::ZoomIndex;
pub use merge::{BoxMerger, MergeResult};
pub use plan::{plan_seed, PlanOptions, SeedPlan};
pub use pyramid::GapFiller;
pub use tiles::{tile_index, TileExt, TileIndex};
