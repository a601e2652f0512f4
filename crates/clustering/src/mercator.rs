//! Web Mercator pixel projection.

use std::f64::consts::PI;

/// Tile edge length in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Highest zoom level supported by standard tile sets.
pub const MAX_ZOOM: u32 = 22;

/// Latitude limit of the Web Mercator square.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Position in global pixel space at a given zoom (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPixel {
    pub x: f64,
    pub y: f64,
}

impl WorldPixel {
    /// Project lat/lon to pixels at `zoom`, clamping to the Mercator square.
    pub fn from_latlon(lat: f64, lon: f64, zoom: u32) -> Self {
        let world = world_size(zoom);
        let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

        let x = (lon.clamp(-180.0, 180.0) + 180.0) / 360.0 * world;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world;

        Self { x, y }
    }

    pub fn distance_squared(&self, other: &WorldPixel) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Edge length of the whole world in pixels at `zoom`.
pub fn world_size(zoom: u32) -> f64 {
    TILE_SIZE * 2f64.powi(zoom.min(MAX_ZOOM) as i32)
}
