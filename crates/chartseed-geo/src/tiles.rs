//! Web Mercator tile math
//!
//! Converts geographic coordinates to slippy map tile indices and counts or
//! enumerates the tiles a box covers.

use chartseed_core::models::ZoomBox;
use std::f64::consts::PI;

/// A tile address in the standard Web Mercator tiling scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    pub x: i64,
    pub y: i64,
    pub zoom: i32,
}

/// Converts a geographic coordinate to the tile containing it.
///
/// Latitudes beyond the Mercator limit are not clamped; the resulting row
/// saturates instead.
#[inline]
pub fn tile_index(lat: f64, lng: f64, zoom: i32) -> TileIndex {
    let n = 2.0_f64.powi(zoom);

    let x = ((lng + 180.0) / 360.0 * n).floor() as i64;

    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor() as i64;

    TileIndex { x, y, zoom }
}

/// Tile operations on boxes
pub trait TileExt {
    /// Number of tiles covering the box at its own zoom, 0 for negative zooms
    fn num_tiles(&self) -> u64;

    /// Every tile covering the box at `zoom + delta_zoom`
    fn tile_list(&self, delta_zoom: i32) -> Vec<TileIndex>;
}

impl TileExt for ZoomBox {
    fn num_tiles(&self) -> u64 {
        if self.zoom < 0 {
            return 0;
        }
        let ne = tile_index(self.northeast.lat, self.northeast.lng, self.zoom);
        let sw = tile_index(self.southwest.lat, self.southwest.lng, self.zoom);

        let x_count = ne.x.abs_diff(sw.x) + 1;
        let y_count = ne.y.abs_diff(sw.y) + 1;
        x_count.saturating_mul(y_count)
    }

    fn tile_list(&self, delta_zoom: i32) -> Vec<TileIndex> {
        let zoom = self.zoom + delta_zoom;
        if zoom < 0 {
            return Vec::new();
        }
        let ne = tile_index(self.northeast.lat, self.northeast.lng, zoom);
        let sw = tile_index(self.southwest.lat, self.southwest.lng, zoom);

        let (x_min, x_max) = (ne.x.min(sw.x), ne.x.max(sw.x));
        let (y_min, y_max) = (ne.y.min(sw.y), ne.y.max(sw.y));

        let mut tiles = Vec::new();
        for x in x_min..=x_max {
            for y in y_min..=y_max {
                tiles.push(TileIndex { x, y, zoom });
            }
        }
        tiles
    }
}
