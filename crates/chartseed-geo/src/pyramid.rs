//! Pyramid gap filling.
//!
//! A renderer can fall back to a coarser level when finer tiles are missing,
//! but only up to `max_empty` levels. For every box we therefore require an
//! ancestor within `max_empty + 1` levels that covers the same tiles, and
//! synthesize one when none exists.

use crate::coalesce::Coalescer;
use crate::index::ZoomIndex;
use crate::tiles::{TileExt, TileIndex};
use chartseed_core::models::ZoomBox;
use std::collections::HashSet;

/// Synthesizes ancestor boxes so no zoom level gap exceeds `max_empty`
#[derive(Debug, Clone, Copy)]
pub struct GapFiller {
    max_empty: u32,
}

impl Default for GapFiller {
    fn default() -> Self {
        Self::new(1)
    }
}

impl GapFiller {
    pub fn new(max_empty: u32) -> Self {
        Self { max_empty }
    }

    pub fn max_empty(&self) -> u32 {
        self.max_empty
    }

    /// Check whether `b` is covered by an ancestor within the level budget.
    ///
    /// An ancestor level covers `b` when one of its boxes contains `b`, or
    /// when the tiles of its boxes intersecting `b` include every tile of `b`
    /// at that level.
    pub fn has_ancestor(&self, index: &ZoomIndex, b: &ZoomBox) -> bool {
        let Some(min_zoom) = index.min_zoom() else {
            return false;
        };

        let max_down = self.max_empty as i32 + 1;
        let mut down = 1;
        let mut zoom = b.zoom - 1;

        while zoom >= min_zoom && down <= max_down {
            let mut partial = Vec::new();
            for candidate in index.level(zoom) {
                if candidate.contains(b) {
                    return true;
                }
                if let Some(i) = candidate.intersection(b) {
                    partial.push(i);
                }
            }

            if !partial.is_empty() && covers_tiles(&partial, b, down) {
                return true;
            }

            down += 1;
            zoom -= 1;
        }
        false
    }

    /// Walk the index from the finest level down to one above the coarsest
    /// and insert a synthetic ancestor for every uncovered box.
    ///
    /// Synthesized boxes are added to `index` right away so coarser levels
    /// see them as candidates. Returns only the synthesized boxes.
    pub fn fill(&self, index: &mut ZoomIndex) -> Vec<ZoomBox> {
        let (Some(min_zoom), Some(max_zoom)) = (index.min_zoom(), index.max_zoom()) else {
            return Vec::new();
        };

        let mut created = Vec::new();
        for zoom in ((min_zoom + 1)..=max_zoom).rev() {
            // Only coarser levels receive boxes while this level is processed.
            let count = index.level(zoom).len();
            for i in 0..count {
                let b = index.level(zoom)[i].clone();
                if self.has_ancestor(index, &b) {
                    continue;
                }

                let upper_zoom = (b.zoom - self.max_empty as i32 - 1).max(min_zoom);
                if upper_zoom >= b.zoom {
                    tracing::error!("internal error, no upper zoom for {}", b);
                    continue;
                }

                let mut upper = b
                    .clone()
                    .with_zoom(upper_zoom)
                    .with_name(format!("COMP{:05}", created.len()));
                upper.synthetic = true;
                tracing::info!("creating upper box {} for {}", upper, b);

                index.insert(upper.clone());
                created.push(upper);
            }
        }

        tracing::info!("created {} additional boxes", created.len());
        created
    }
}

/// Check that the tiles of `partial` (already at the ancestor level) include
/// all tiles of `b` taken `down` levels up
fn covers_tiles(partial: &[ZoomBox], b: &ZoomBox, down: i32) -> bool {
    let found: HashSet<TileIndex> = partial.iter().flat_map(|p| p.tile_list(0)).collect();
    b.tile_list(-down).iter().all(|tile| found.contains(tile))
}

/// Compute the additional boxes for a finished box list: fill the pyramid
/// gaps and coalesce what was synthesized
pub fn compute_missing(boxes: Vec<ZoomBox>, max_empty: u32) -> Vec<ZoomBox> {
    let mut index = ZoomIndex::from_boxes(boxes);
    let created = GapFiller::new(max_empty).fill(&mut index);
    let combined = Coalescer::default().coalesce(created);
    tracing::info!("{} boxes after combination", combined.len());
    combined
}
