//! Bridges between chartseed boxes and the `geo` crate.

use geo::{coord, Area, Rect};

// Re-export canonical types from chartseed-core
pub use chartseed_core::models::{LatLng, ZoomBox};

/// Convert a box to a geo::Rect (x = longitude, y = latitude)
pub fn to_rect(b: &ZoomBox) -> Rect<f64> {
    Rect::new(
        coord! { x: b.southwest.lng, y: b.southwest.lat },
        coord! { x: b.northeast.lng, y: b.northeast.lat },
    )
}

/// Convert a geo::Rect back to a box at the given zoom
pub fn from_rect(rect: &Rect<f64>, zoom: i32) -> ZoomBox {
    let min = rect.min();
    let max = rect.max();
    ZoomBox::new(LatLng::new(max.y, max.x), LatLng::new(min.y, min.x), zoom)
}

/// Extension trait for boxes with geo-crate operations
pub trait BoxGeoExt {
    /// Convert to geo::Rect
    fn to_rect(&self) -> Rect<f64>;

    /// Planar area in square degrees
    fn area(&self) -> f64;
}

impl BoxGeoExt for ZoomBox {
    fn to_rect(&self) -> Rect<f64> {
        to_rect(self)
    }

    fn area(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        to_rect(self).unsigned_area()
    }
}
