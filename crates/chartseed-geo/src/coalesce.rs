//! Coalescing of boxes per zoom level.
//!
//! Boxes that share an edge (within a tolerance) are merged by a greedy scan
//! over two sort orders, then boxes contained in a larger survivor are
//! dropped. The passes repeat until a round removes nothing, so coalescing
//! an already coalesced list is a no-op.

use crate::index::ZoomIndex;
use crate::models::BoxGeoExt;
use chartseed_core::models::{ZoomBox, DEFAULT_CLOSE_TOLERANCE};
use std::cmp::Ordering;

/// Merges edge-adjacent boxes and removes contained ones
#[derive(Debug, Clone, Copy)]
pub struct Coalescer {
    tolerance: f64,
}

impl Default for Coalescer {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_TOLERANCE)
    }
}

impl Coalescer {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Check whether two boxes share a full edge
    pub fn can_combine(&self, a: &ZoomBox, b: &ZoomBox) -> bool {
        self.east_of(a, b) || self.east_of(b, a) || self.south_of(a, b) || self.south_of(b, a)
    }

    /// `next` continues `b` to the east
    fn east_of(&self, b: &ZoomBox, next: &ZoomBox) -> bool {
        b.northeast.close_to(&next.northwest(), self.tolerance)
            && b.southeast().close_to(&next.southwest, self.tolerance)
    }

    /// `next` continues `b` to the south
    fn south_of(&self, b: &ZoomBox, next: &ZoomBox) -> bool {
        b.southwest.close_to(&next.northwest(), self.tolerance)
            && b.southeast().close_to(&next.northeast, self.tolerance)
    }

    /// Coalesce a box list; the result is ordered by zoom level
    pub fn coalesce(&self, boxes: Vec<ZoomBox>) -> Vec<ZoomBox> {
        let start = boxes.len();
        let index = ZoomIndex::from_boxes(boxes);

        let mut result = Vec::new();
        for zoom in index.zoom_levels() {
            let level = index.level(zoom).to_vec();
            tracing::info!("{} boxes on zoom {}", level.len(), zoom);
            result.extend(self.coalesce_level(level, zoom));
        }

        tracing::info!("reduced from {} to {} boxes", start, result.len());
        result
    }

    /// Coalesce the boxes of a single zoom level
    pub fn coalesce_level(&self, boxes: Vec<ZoomBox>, zoom: i32) -> Vec<ZoomBox> {
        let mut current = boxes;
        loop {
            let before = current.len();

            current.sort_by(lng_major);
            current = self.combine_sorted(current);
            tracing::debug!("{} boxes on zoom {} after pass#1", current.len(), zoom);

            current.sort_by(lat_major);
            current = self.combine_sorted(current);
            tracing::debug!("{} boxes on zoom {} after pass#2", current.len(), zoom);

            current = remove_contained(current);
            tracing::debug!("{} boxes on zoom {} after pass#3", current.len(), zoom);

            if current.len() >= before {
                return current;
            }
        }
    }

    /// Greedy merge of neighbours in scan order
    fn combine_sorted(&self, boxes: Vec<ZoomBox>) -> Vec<ZoomBox> {
        let mut result = Vec::with_capacity(boxes.len());
        let mut combined: Option<ZoomBox> = None;

        for b in boxes {
            combined = Some(match combined.take() {
                None => b,
                Some(mut acc) if self.can_combine(&acc, &b) => {
                    tracing::debug!("combine {} and {}", acc, b);
                    acc.extend(&b);
                    acc
                }
                Some(acc) => {
                    result.push(acc);
                    b
                }
            });
        }

        result.extend(combined);
        result
    }
}

/// Drop boxes contained in a larger one, testing the largest boxes first
fn remove_contained(mut boxes: Vec<ZoomBox>) -> Vec<ZoomBox> {
    boxes.sort_by(|a, b| b.area().total_cmp(&a.area()));

    let mut reduced: Vec<ZoomBox> = Vec::with_capacity(boxes.len());
    for b in boxes {
        if reduced.iter().any(|kept| kept.contains(&b)) {
            tracing::debug!("skipping already contained {}", b);
            continue;
        }
        reduced.push(b);
    }
    reduced
}

/// Scan order by northeast longitude, then northeast latitude
fn lng_major(a: &ZoomBox, b: &ZoomBox) -> Ordering {
    a.northeast
        .lng
        .total_cmp(&b.northeast.lng)
        .then(a.northeast.lat.total_cmp(&b.northeast.lat))
        .then(a.southwest.lng.total_cmp(&b.southwest.lng))
        .then(a.southwest.lat.total_cmp(&b.southwest.lat))
}

/// Scan order by northeast latitude, then northeast longitude
fn lat_major(a: &ZoomBox, b: &ZoomBox) -> Ordering {
    a.northeast
        .lat
        .total_cmp(&b.northeast.lat)
        .then(a.northeast.lng.total_cmp(&b.northeast.lng))
        .then(a.southwest.lat.total_cmp(&b.southwest.lat))
        .then(a.southwest.lng.total_cmp(&b.southwest.lng))
}
