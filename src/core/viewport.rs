use crate::core::{
    geo::{LatLng, LatLngBounds, Point},
    projection::{self, HexProjection},
};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in map coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
    /// Zoom levels are snapped to multiples of this value (0 disables snapping)
    pub zoom_snap: f64,
    #[serde(skip)]
    projection: HexProjection,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom,
            size,
            min_zoom: f64::NEG_INFINITY,
            max_zoom: f64::INFINITY,
            zoom_snap: 0.0,
            projection: HexProjection::default(),
        }
    }

    /// Sets the zoom limits and snap, clamping the current zoom
    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64, zoom_snap: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom_snap = zoom_snap;
        self.zoom = self.limit_zoom(self.zoom);
        self
    }

    pub fn projection(&self) -> &HexProjection {
        &self.projection
    }

    /// Clamps a zoom level to the allowed range
    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Sets center and zoom; returns whether the zoom level changed.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> bool {
        let zoom = self.limit_zoom(zoom);
        let zoom_changed = (zoom - self.zoom).abs() > f64::EPSILON;
        self.center = center;
        self.zoom = zoom;
        zoom_changed
    }

    /// Projects a coordinate to world pixel coordinates at the current zoom
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        self.projection.lat_lng_to_point(lat_lng, self.zoom)
    }

    /// Unprojects world pixel coordinates at the current zoom
    pub fn unproject(&self, point: &Point) -> LatLng {
        self.projection.point_to_lat_lng(point, self.zoom)
    }

    /// World pixel position of the top-left corner of the view
    pub fn pixel_origin(&self) -> Point {
        self.project(&self.center)
            .subtract(&self.size.divide(2.0))
            .floor()
    }

    /// Converts a coordinate to a layer point (relative to the pixel origin)
    pub fn lat_lng_to_layer_point(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng).subtract(&self.pixel_origin())
    }

    /// Converts a layer point back to a coordinate
    pub fn layer_point_to_lat_lng(&self, point: &Point) -> LatLng {
        self.unproject(&point.add(&self.pixel_origin()))
    }

    /// Map area currently in view
    pub fn bounds(&self) -> LatLngBounds {
        let origin = self.pixel_origin();
        let top_left = self.unproject(&origin);
        let bottom_right = self.unproject(&origin.add(&self.size));
        LatLngBounds::from_coords(
            bottom_right.lat,
            top_left.lng,
            top_left.lat,
            bottom_right.lng,
        )
    }

    /// Largest (snapped, clamped) zoom at which `bounds` fits in the view.
    pub fn bounds_zoom(&self, bounds: &LatLngBounds) -> f64 {
        let nw = self.projection.lat_lng_to_point(&bounds.north_west(), self.zoom);
        let se = self.projection.lat_lng_to_point(&bounds.south_east(), self.zoom);
        let bounds_size = se.subtract(&nw);

        let scale_x = self.size.x / bounds_size.x.abs();
        let scale_y = self.size.y / bounds_size.y.abs();
        let scale = scale_x.min(scale_y);
        if scale.is_nan() {
            return self.limit_zoom(self.zoom);
        }

        let mut zoom = self.zoom + projection::zoom_for_scale(scale);
        if self.zoom_snap > 0.0 && zoom.is_finite() {
            zoom = (zoom / self.zoom_snap).floor() * self.zoom_snap;
        }
        self.limit_zoom(zoom)
    }

    /// Centers on `bounds` at the largest zoom that shows all of it;
    /// returns whether the zoom level changed.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) -> bool {
        let zoom = self.bounds_zoom(bounds);
        self.set_view(bounds.center(), zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), 0.0, Point::new(1024.0, 768.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(1000.0, 1000.0), 0.0, Point::new(800.0, 600.0))
            .with_zoom_limits(-6.0, 6.0, 0.1)
    }

    #[test]
    fn test_layer_point_round_trip() {
        let vp = viewport();
        let lat_lng = LatLng::new(1234.5, 987.25);
        let back = vp.layer_point_to_lat_lng(&vp.lat_lng_to_layer_point(&lat_lng));
        assert_relative_eq!(back.lat, lat_lng.lat, epsilon = 1e-9);
        assert_relative_eq!(back.lng, lat_lng.lng, epsilon = 1e-9);
    }

    #[test]
    fn test_center_sits_in_middle_of_view() {
        let vp = viewport();
        let center = vp.lat_lng_to_layer_point(&vp.center);
        assert!((center.x - 400.0).abs() <= 1.0);
        assert!((center.y - 300.0).abs() <= 1.0);
    }

    #[test]
    fn test_set_view_reports_zoom_change() {
        let mut vp = viewport();
        assert!(!vp.set_view(LatLng::new(0.0, 0.0), 0.0));
        assert!(vp.set_view(LatLng::new(0.0, 0.0), 2.0));
        // clamped
        vp.set_view(LatLng::new(0.0, 0.0), 40.0);
        assert_eq!(vp.zoom, 6.0);
    }

    #[test]
    fn test_fit_bounds_world() {
        let mut vp = viewport();
        let world = LatLngBounds::from_coords(0.0, 0.0, 23040.0, 23040.0);
        vp.fit_bounds(&world);

        assert_eq!(vp.center, world.center());
        // 23040 units must fit in 600 px of height (less after the squish)
        assert!(vp.zoom < -5.0 && vp.zoom > -6.0);
        let nw = vp.lat_lng_to_layer_point(&world.north_west());
        let se = vp.lat_lng_to_layer_point(&world.south_east());
        assert!(se.x - nw.x <= 800.0 + 1e-6);
        assert!(se.y - nw.y <= 600.0 + 1e-6);
    }

    #[test]
    fn test_fit_single_point_uses_max_zoom() {
        let mut vp = viewport();
        let p = LatLng::new(50.0, 50.0);
        vp.fit_bounds(&LatLngBounds::new(p, p));
        assert_eq!(vp.zoom, 6.0);
        assert_eq!(vp.center, p);
    }
}
