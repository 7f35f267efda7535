//! Intersects chart boxes with a selection.
//!
//! For every reference box the per-selection intersections are unioned (a
//! chart may straddle several disjoint selection parts) and the union is
//! intersected with the chart again, so the result never leaves the chart.

use crate::database::BoxDatabase;
use crate::tiles::TileExt;
use chartseed_core::models::ZoomBox;
use chartseed_core::Result;

/// Boxes covering a selection together with their tile estimate
#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    pub boxes: Vec<ZoomBox>,
    /// Sum of per-box tile counts; overlaps within a level are counted twice
    pub num_tiles: u64,
}

/// Merges reference boxes against a selection within a zoom window
#[derive(Debug, Clone, Copy)]
pub struct BoxMerger {
    min_zoom: i32,
    max_zoom: i32,
}

impl Default for BoxMerger {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

impl BoxMerger {
    pub fn new(min_zoom: i32, max_zoom: i32) -> Self {
        Self { min_zoom, max_zoom }
    }

    /// The part of `reference` covered by `selection`, if any
    pub fn merge_box(&self, reference: &ZoomBox, selection: &[ZoomBox]) -> Option<ZoomBox> {
        if reference.zoom < self.min_zoom || reference.zoom > self.max_zoom {
            return None;
        }

        let mut union: Option<ZoomBox> = None;
        for part in selection {
            let Some(current) = reference.intersection(part) else {
                continue;
            };
            union = Some(match union.take() {
                Some(mut u) => {
                    u.extend(&current);
                    u
                }
                None => current,
            });
        }

        reference.intersection(&union?)
    }

    /// Merge a sequence of reference boxes
    pub fn merge<I>(&self, reference: I, selection: &[ZoomBox]) -> MergeResult
    where
        I: IntoIterator<Item = ZoomBox>,
    {
        let mut result = MergeResult::default();
        for chart in reference {
            self.accumulate(&chart, selection, &mut result);
        }
        result
    }

    /// Merge every box of a database file
    pub fn merge_database(&self, db: &BoxDatabase, selection: &[ZoomBox]) -> Result<MergeResult> {
        let mut result = MergeResult::default();
        let skipped = db.for_each_box(|chart| self.accumulate(&chart, selection, &mut result))?;

        tracing::info!(
            "merged {} boxes with {} tiles from {} ({} lines skipped)",
            result.boxes.len(),
            result.num_tiles,
            db.path().display(),
            skipped
        );
        Ok(result)
    }

    fn accumulate(&self, chart: &ZoomBox, selection: &[ZoomBox], result: &mut MergeResult) {
        if let Some(merged) = self.merge_box(chart, selection) {
            tracing::debug!("adding from {}: {}", chart, merged);
            result.num_tiles = result.num_tiles.saturating_add(merged.num_tiles());
            result.boxes.push(merged);
        }
    }
}
