//! Seed configuration document.
//!
//! One seed per zoom level, each referencing one coverage per box. Written
//! as JSON, which YAML 1.2 readers load unchanged.

use chartseed_core::models::ZoomBox;
use chartseed_core::Result;
use chartseed_geo::ZoomIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Spatial reference of every coverage bbox
pub const COVERAGE_SRS: &str = "EPSG:4326";

/// A complete seed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeedDocument {
    pub seeds: BTreeMap<String, SeedEntry>,
    pub coverages: BTreeMap<String, Coverage>,
}

/// Seed task for a single zoom level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedEntry {
    pub caches: Vec<String>,
    pub levels: Vec<i32>,
    pub coverages: Vec<String>,
}

/// A named bounding box, `[swlng, swlat, nelng, nelat]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub srs: String,
    pub bbox: [f64; 4],
}

impl Coverage {
    pub fn from_box(b: &ZoomBox) -> Self {
        Self { srs: COVERAGE_SRS.to_string(), bbox: b.seed_bounds() }
    }
}

impl SeedDocument {
    /// Build a document from boxes grouped by zoom level.
    ///
    /// Seeds are named `<prefix>_<zzz>`, coverages `<prefix>_<zzz>_<box>`.
    /// Unnamed boxes use their position in the level, repeated names get a
    /// numeric suffix.
    pub fn build(index: &ZoomIndex, prefix: &str, caches: &[String]) -> Self {
        let mut document = SeedDocument::default();

        for zoom in index.zoom_levels() {
            let seed_name = format!("{}_{:03}", prefix, zoom);
            let mut coverage_names = Vec::new();

            for (i, b) in index.level(zoom).iter().enumerate() {
                let box_name = b.name.clone().unwrap_or_else(|| format!("{:05}", i));
                let base = format!("{}_{}", seed_name, box_name);
                let mut name = base.clone();
                let mut suffix = i;
                while document.coverages.contains_key(&name) {
                    name = format!("{}_{}", base, suffix);
                    suffix += 1;
                }
                document.coverages.insert(name.clone(), Coverage::from_box(b));
                coverage_names.push(name);
            }

            let entry =
                SeedEntry { caches: caches.to_vec(), levels: vec![zoom], coverages: coverage_names };
            document.seeds.insert(seed_name, entry);
        }

        document
    }

    /// Write the document, replacing any previous file atomically
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        tracing::debug!("wrote seed config {}", path.display());
        Ok(())
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&content)?)
    }

    pub fn num_coverages(&self) -> usize {
        self.coverages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn index() -> ZoomIndex {
        ZoomIndex::from_boxes(vec![
            ZoomBox::from_edges(24.0, 119.0, 25.0, 120.0, 12).with_name("1U319240"),
            ZoomBox::from_edges(54.0, 10.0, 54.5, 10.5, 12).with_name("DE1"),
            ZoomBox::from_edges(50.0, 5.0, 60.0, 15.0, 7),
        ])
    }

    #[test]
    fn test_one_seed_per_zoom() {
        let caches = vec!["osm".to_string()];
        let doc = SeedDocument::build(&index(), "baltic", &caches);

        assert_eq!(doc.seeds.len(), 2);
        let seed = &doc.seeds["baltic_012"];
        assert_eq!(seed.levels, vec![12]);
        assert_eq!(seed.caches, caches);
        assert_eq!(seed.coverages, vec!["baltic_012_1U319240", "baltic_012_DE1"]);
        assert_eq!(doc.seeds["baltic_007"].coverages, vec!["baltic_007_00000"]);
    }

    #[test]
    fn test_coverage_bounds_order() {
        let doc = SeedDocument::build(&index(), "baltic", &[]);
        let coverage = &doc.coverages["baltic_012_DE1"];

        assert_eq!(coverage.srs, "EPSG:4326");
        assert_eq!(coverage.bbox, [10.0, 54.0, 10.5, 54.5]);
    }

    #[test]
    fn test_duplicate_box_names_are_kept_apart() {
        let index = ZoomIndex::from_boxes(vec![
            ZoomBox::from_edges(0.0, 0.0, 1.0, 1.0, 5).with_name("A"),
            ZoomBox::from_edges(2.0, 2.0, 3.0, 3.0, 5).with_name("A"),
        ]);
        let doc = SeedDocument::build(&index, "s", &[]);

        assert_eq!(doc.num_coverages(), 2);
        assert_eq!(doc.seeds["s_005"].coverages, vec!["s_005_A", "s_005_A_1"]);
    }

    #[test]
    fn test_suffixed_name_never_replaces_a_coverage() {
        let index = ZoomIndex::from_boxes(vec![
            ZoomBox::from_edges(0.0, 0.0, 1.0, 1.0, 5).with_name("A"),
            ZoomBox::from_edges(2.0, 2.0, 3.0, 3.0, 5).with_name("A"),
            ZoomBox::from_edges(4.0, 4.0, 5.0, 5.0, 5).with_name("A_1"),
        ]);
        let doc = SeedDocument::build(&index, "s", &[]);

        assert_eq!(doc.num_coverages(), 3);
        let names = &doc.seeds["s_005"].coverages;
        assert_eq!(names.len(), 3);
        assert_eq!(doc.coverages[&names[2]].bbox, [4.0, 4.0, 5.0, 5.0]);
    }

    #[test]
    fn test_write_and_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.json");
        let doc = SeedDocument::build(&index(), "baltic", &["osm".to_string()]);

        doc.write(&path).unwrap();

        assert_eq!(SeedDocument::read(&path).unwrap(), doc);
        assert!(!dir.path().join("seed.tmp").exists());
    }
}
