//! Axis-aligned lat/lon boxes tagged with a zoom level.
//!
//! Only [`ZoomBox::extend`] mutates a box. It is meant for boxes that are
//! still being built (merge accumulators, coalescer candidates); boxes that
//! have been handed to a zoom index are treated as values and cloned.

use crate::error::{ChartseedError, Result};
use crate::models::coordinate::LatLng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangular coverage region at one zoom level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomBox {
    #[serde(rename = "ne", alias = "northeast", alias = "_northEast")]
    pub northeast: LatLng,

    #[serde(rename = "sw", alias = "southwest", alias = "_southWest")]
    pub southwest: LatLng,

    /// Zoom level; selection boxes without a zoom get 0
    #[serde(alias = "z", default)]
    pub zoom: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Set for boxes created by the pyramid gap filler
    #[serde(default, skip_serializing)]
    pub synthetic: bool,
}

impl ZoomBox {
    pub fn new(northeast: LatLng, southwest: LatLng, zoom: i32) -> Self {
        Self { northeast, southwest, zoom, name: None, synthetic: false }
    }

    /// Build a box from south/west/north/east edges
    pub fn from_edges(south: f64, west: f64, north: f64, east: f64, zoom: i32) -> Self {
        Self::new(LatLng::new(north, east), LatLng::new(south, west), zoom)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_zoom(mut self, zoom: i32) -> Self {
        self.zoom = zoom;
        self
    }

    /// A box is valid when its northeast corner is not south or west of its
    /// southwest corner
    pub fn is_valid(&self) -> bool {
        self.northeast.lat >= self.southwest.lat && self.northeast.lng >= self.southwest.lng
    }

    /// Intersect two boxes.
    ///
    /// The result keeps the zoom and name of `self`. Boxes that only touch
    /// along an edge or a corner do not intersect.
    pub fn intersection(&self, other: &ZoomBox) -> Option<ZoomBox> {
        let northeast = self.northeast.min(&other.northeast);
        let southwest = self.southwest.max(&other.southwest);

        if northeast.lat <= southwest.lat || northeast.lng <= southwest.lng {
            return None;
        }

        Some(ZoomBox {
            northeast,
            southwest,
            zoom: self.zoom,
            name: self.name.clone(),
            synthetic: false,
        })
    }

    /// Grow this box to the bounding box of itself and `other`.
    ///
    /// Returns whether any edge moved.
    pub fn extend(&mut self, other: &ZoomBox) -> bool {
        let northeast = self.northeast.max(&other.northeast);
        let southwest = self.southwest.min(&other.southwest);
        let changed = northeast != self.northeast || southwest != self.southwest;

        self.northeast = northeast;
        self.southwest = southwest;
        changed
    }

    /// Check whether `other` lies completely inside this box
    pub fn contains(&self, other: &ZoomBox) -> bool {
        self.northeast.lat >= other.northeast.lat
            && self.northeast.lng >= other.northeast.lng
            && self.southwest.lat <= other.southwest.lat
            && self.southwest.lng <= other.southwest.lng
    }

    /// Check whether the rectangles overlap or touch
    pub fn touches(&self, other: &ZoomBox) -> bool {
        !(self.northeast.lat < other.southwest.lat
            || self.northeast.lng < other.southwest.lng
            || self.southwest.lat > other.northeast.lat
            || self.southwest.lng > other.northeast.lng)
    }

    /// The northwest corner
    pub fn northwest(&self) -> LatLng {
        LatLng::new(self.northeast.lat, self.southwest.lng)
    }

    /// The southeast corner
    pub fn southeast(&self) -> LatLng {
        LatLng::new(self.southwest.lat, self.northeast.lng)
    }

    /// Bounds in the order expected by seed coverages: swlng, swlat, nelng, nelat
    pub fn seed_bounds(&self) -> [f64; 4] {
        [self.southwest.lng, self.southwest.lat, self.northeast.lng, self.northeast.lat]
    }
}

impl fmt::Display for ZoomBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Box: ne=[{}],sw=[{}],z={}", self.northeast, self.southwest, self.zoom)?;
        if let Some(ref name) = self.name {
            write!(f, ",name={}", name)?;
        }
        Ok(())
    }
}

/// Parse a selection document: a JSON list of boxes
pub fn parse_selection(content: &str) -> Result<Vec<ZoomBox>> {
    let boxes: Vec<ZoomBox> = serde_json::from_str(content)
        .map_err(|e| ChartseedError::InvalidSelection { reason: e.to_string() })?;

    if boxes.is_empty() {
        return Err(ChartseedError::InvalidSelection {
            reason: "selection contains no boxes".to_string(),
        });
    }

    Ok(boxes)
}
