//! Zoom-indexed box collections.

use chartseed_core::models::ZoomBox;
use std::collections::BTreeMap;

/// Boxes grouped by zoom level, in insertion order within a level.
///
/// Boxes are stored as values: readers get slices and clone what they keep,
/// so appending to one level never invalidates a copy taken from another.
#[derive(Debug, Clone, Default)]
pub struct ZoomIndex {
    levels: BTreeMap<i32, Vec<ZoomBox>>,
}

impl ZoomIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a finished box list, dropping degenerate boxes
    pub fn from_boxes<I: IntoIterator<Item = ZoomBox>>(boxes: I) -> Self {
        let mut index = Self::new();
        for b in boxes {
            index.insert(b);
        }
        index
    }

    /// Append a box to its zoom level
    pub fn insert(&mut self, b: ZoomBox) {
        if !b.is_valid() {
            tracing::debug!("ignoring degenerate box {}", b);
            return;
        }
        self.levels.entry(b.zoom).or_default().push(b);
    }

    /// Zoom levels present, ascending
    pub fn zoom_levels(&self) -> Vec<i32> {
        self.levels.keys().copied().collect()
    }

    pub fn min_zoom(&self) -> Option<i32> {
        self.levels.keys().next().copied()
    }

    pub fn max_zoom(&self) -> Option<i32> {
        self.levels.keys().next_back().copied()
    }

    /// Boxes at one zoom level (empty for unknown levels)
    pub fn level(&self, zoom: i32) -> &[ZoomBox] {
        self.levels.get(&zoom).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All boxes, ordered by zoom level
    pub fn iter(&self) -> impl Iterator<Item = &ZoomBox> {
        self.levels.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn into_boxes(self) -> Vec<ZoomBox> {
        self.levels.into_values().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_zoom() {
        let index = ZoomIndex::from_boxes(vec![
            ZoomBox::from_edges(0.0, 0.0, 1.0, 1.0, 12).with_name("a"),
            ZoomBox::from_edges(0.0, 0.0, 1.0, 1.0, 8).with_name("b"),
            ZoomBox::from_edges(2.0, 2.0, 3.0, 3.0, 12).with_name("c"),
        ]);

        assert_eq!(index.zoom_levels(), vec![8, 12]);
        assert_eq!(index.min_zoom(), Some(8));
        assert_eq!(index.max_zoom(), Some(12));
        assert_eq!(index.level(12).len(), 2);
        assert_eq!(index.level(12)[1].name.as_deref(), Some("c"));
        assert!(index.level(10).is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_drops_degenerate_boxes() {
        let index = ZoomIndex::from_boxes(vec![ZoomBox::from_edges(1.0, 1.0, 0.0, 0.0, 4)]);
        assert!(index.is_empty());
        assert_eq!(index.min_zoom(), None);
    }

    #[test]
    fn test_into_boxes_ordered_by_zoom() {
        let index = ZoomIndex::from_boxes(vec![
            ZoomBox::from_edges(0.0, 0.0, 1.0, 1.0, 9),
            ZoomBox::from_edges(0.0, 0.0, 1.0, 1.0, 3),
        ]);
        let zooms: Vec<i32> = index.into_boxes().iter().map(|b| b.zoom).collect();
        assert_eq!(zooms, vec![3, 9]);
    }
}
