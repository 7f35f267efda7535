use chartseed_core::models::ZoomBox;
use chartseed_geo::TileExt;
use serde::Serialize;
use tabled::Tabled;

/// One box as shown in tables and JSON results
#[derive(Debug, Serialize, Tabled)]
pub struct BoxRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Zoom")]
    pub zoom: i32,
    #[tabled(rename = "South")]
    pub south: f64,
    #[tabled(rename = "West")]
    pub west: f64,
    #[tabled(rename = "North")]
    pub north: f64,
    #[tabled(rename = "East")]
    pub east: f64,
    #[tabled(rename = "Tiles")]
    pub tiles: u64,
    #[tabled(rename = "Synthetic")]
    pub synthetic: bool,
}

impl From<&ZoomBox> for BoxRow {
    fn from(b: &ZoomBox) -> Self {
        Self {
            name: b.name.clone().unwrap_or_default(),
            zoom: b.zoom,
            south: b.southwest.lat,
            west: b.southwest.lng,
            north: b.northeast.lat,
            east: b.northeast.lng,
            tiles: b.num_tiles(),
            synthetic: b.synthetic,
        }
    }
}

/// Output for merge command
#[derive(Debug, Serialize)]
pub struct MergeOutput {
    pub boxes: Vec<BoxRow>,
    pub merged_count: usize,
    pub synthesized_count: usize,
    pub num_tiles: u64,
    pub total_tiles: u64,
}

/// Output for count command
#[derive(Debug, Serialize)]
pub struct CountOutput {
    pub box_count: usize,
    pub num_tiles: u64,
    pub max_tiles: u64,
    pub within_budget: bool,
}

/// Output for missing command
#[derive(Debug, Serialize)]
pub struct MissingOutput {
    pub input_boxes: usize,
    pub created_boxes: usize,
    pub output: String,
}

/// Output for coalesce command
#[derive(Debug, Serialize)]
pub struct CoalesceOutput {
    pub input_boxes: usize,
    pub output_boxes: usize,
}

/// One configuration value with its source
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// Output for seed run and seed resume
#[derive(Debug, Serialize)]
pub struct SeedRunOutput {
    pub started: bool,
    pub num_tiles: Option<u64>,
    pub status: chartseed_core::models::SeedStatus,
}
