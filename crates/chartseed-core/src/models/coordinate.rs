//! Latitude/longitude pairs.
//!
//! Values are plain degrees and are never normalized: out of range input is
//! carried through as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute tolerance in degrees used to decide that two corners coincide
pub const DEFAULT_CLOSE_TOLERANCE: f64 = 0.01;

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check whether both coordinate deltas are within `tolerance` degrees
    pub fn close_to(&self, other: &LatLng, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }

    /// Componentwise minimum
    pub fn min(&self, other: &LatLng) -> LatLng {
        LatLng::new(self.lat.min(other.lat), self.lng.min(other.lng))
    }

    /// Componentwise maximum
    pub fn max(&self, other: &LatLng) -> LatLng {
        LatLng::new(self.lat.max(other.lat), self.lng.max(other.lng))
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat={:.6},lon={:.6}", self.lat, self.lng)
    }
}
