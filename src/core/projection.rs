//! Projection between game coordinates and the map's rendering plane.
//!
//! The BitCraft world is a square grid of hexagonal cells. The terrain image
//! is drawn with the north axis stretched by the hexagon apothem ratio, so
//! markers must be squished by the same factor to land on the right cell.

use crate::core::{
    constants::{HEX_SQUISH, READABLE_COORD_DIVISOR},
    geo::{LatLng, Point},
};

/// Anisotropic projection: `x = lng`, `y = -lat / s`.
///
/// Rendering Y grows downward while game Z grows north, hence the sign flip.
/// The declared bounds are infinite: nothing is clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexProjection {
    squish: f64,
}

impl HexProjection {
    pub fn new(squish: f64) -> Self {
        Self { squish }
    }

    pub fn squish(&self) -> f64 {
        self.squish
    }

    pub fn project(&self, lat_lng: &LatLng) -> Point {
        Point::new(lat_lng.lng, -lat_lng.lat / self.squish)
    }

    pub fn unproject(&self, point: &Point) -> LatLng {
        LatLng::new(-point.y * self.squish, point.x)
    }

    /// Projects and scales to pixel space at `zoom` (scale `2^zoom`).
    pub fn lat_lng_to_point(&self, lat_lng: &LatLng, zoom: f64) -> Point {
        self.project(lat_lng).multiply(scale(zoom))
    }

    /// Inverse of [`HexProjection::lat_lng_to_point`].
    pub fn point_to_lat_lng(&self, point: &Point, zoom: f64) -> LatLng {
        self.unproject(&point.divide(scale(zoom)))
    }
}

impl Default for HexProjection {
    fn default() -> Self {
        Self::new(HEX_SQUISH)
    }
}

/// Pixels per projected unit at a zoom level.
pub fn scale(zoom: f64) -> f64 {
    2_f64.powf(zoom)
}

/// Zoom level at which one projected unit spans `scale` pixels.
pub fn zoom_for_scale(scale: f64) -> f64 {
    scale.log2()
}

/// The "N / E" coordinates shown to players: `[north, east]`.
///
/// Halves round up, towards positive infinity, as the viewer's readout does.
pub fn readable_coordinates(lat_lng: &LatLng) -> [i64; 2] {
    [
        round_half_up(lat_lng.lat / READABLE_COORD_DIVISOR),
        round_half_up(lat_lng.lng / READABLE_COORD_DIVISOR),
    ]
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Label for the mouse-position readout, e.g. `N: 120 E: 4000`.
pub fn coordinates_label(lat_lng: &LatLng) -> String {
    let [north, east] = readable_coordinates(lat_lng);
    format!("N: {} E: {}", north, east)
}
