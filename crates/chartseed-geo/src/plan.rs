//! Seed planning: from a selection to the complete box list of a seed run.

use crate::database::BoxDatabase;
use crate::index::ZoomIndex;
use crate::merge::BoxMerger;
use crate::pyramid::compute_missing;
use crate::tiles::TileExt;
use chartseed_core::models::ZoomBox;
use chartseed_core::{ChartseedError, Result};

/// Options controlling a planning pass
#[derive(Debug, Clone, Copy)]
pub struct PlanOptions {
    pub min_zoom: i32,
    pub max_zoom: i32,
    /// Fill pyramid gaps with this many allowed empty levels
    pub fill_gaps: Option<u32>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { min_zoom: 0, max_zoom: 20, fill_gaps: None }
    }
}

/// Boxes to seed for one selection
#[derive(Debug, Clone, Default)]
pub struct SeedPlan {
    pub merged: Vec<ZoomBox>,
    pub synthesized: Vec<ZoomBox>,
    /// Tile estimate of the merged boxes
    pub num_tiles: u64,
    /// Tile estimate of the synthesized boxes
    pub synthesized_tiles: u64,
}

impl SeedPlan {
    pub fn total_tiles(&self) -> u64 {
        self.num_tiles.saturating_add(self.synthesized_tiles)
    }

    /// Merged and synthesized boxes together
    pub fn boxes(&self) -> Vec<ZoomBox> {
        self.merged.iter().chain(&self.synthesized).cloned().collect()
    }

    pub fn index(&self) -> ZoomIndex {
        ZoomIndex::from_boxes(self.boxes())
    }

    /// Refuse plans above the tile budget
    pub fn check_budget(&self, max_tiles: u64) -> Result<()> {
        let count = self.total_tiles();
        if count > max_tiles {
            return Err(ChartseedError::TooManyTiles { count, allowed: max_tiles });
        }
        Ok(())
    }
}

/// Merge `selection` against the database and optionally fill the pyramid
pub fn plan_seed(
    db: &BoxDatabase,
    selection: &[ZoomBox],
    options: PlanOptions,
) -> Result<SeedPlan> {
    if options.min_zoom > options.max_zoom {
        return Err(ChartseedError::InvalidSelection {
            reason: format!("min zoom {} above max zoom {}", options.min_zoom, options.max_zoom),
        });
    }

    let merged = BoxMerger::new(options.min_zoom, options.max_zoom).merge_database(db, selection)?;

    let synthesized = match options.fill_gaps {
        Some(max_empty) if !merged.boxes.is_empty() => {
            compute_missing(merged.boxes.clone(), max_empty)
        }
        _ => Vec::new(),
    };
    let synthesized_tiles =
        synthesized.iter().fold(0u64, |sum, b| sum.saturating_add(b.num_tiles()));

    Ok(SeedPlan {
        merged: merged.boxes,
        synthesized,
        num_tiles: merged.num_tiles,
        synthesized_tiles,
    })
}
