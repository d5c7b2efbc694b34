//! Configuration for the map page and its interaction plugins.
//!
//! Every field has a default matching the public BitCraft map, so a JSON
//! config only needs to name what it overrides.

use crate::{
    core::{
        constants::{HEX_SQUISH, MAX_ZOOM, MIN_ZOOM, WORLD_HEIGHT, WORLD_WIDTH, ZOOM_SNAP},
        geo::{LatLng, LatLngBounds, Point},
    },
    layers::vector::PathStyle,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Options of the map page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapOptions {
    /// World extent along the game X axis
    pub world_width: f64,
    /// World extent along the game Z axis
    pub world_height: f64,
    /// Terrain image drawn under every layer
    pub image_url: String,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_snap: f64,
    /// Size of the host's map element, in pixels
    pub viewport_size: Point,
    /// Layers attached when the page opens
    pub default_layers: Vec<String>,
    /// Prefix of the static GeoJSON marker files
    pub markers_path: String,
    pub spiderfy: SpiderfyOptions,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            image_url: "assets/maps/map.png".to_string(),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_snap: ZOOM_SNAP,
            viewport_size: Point::new(1024.0, 768.0),
            default_layers: vec![
                "treesLayer".to_string(),
                "templesLayer".to_string(),
                "ruinedLayer".to_string(),
            ],
            markers_path: "assets/markers/".to_string(),
            spiderfy: SpiderfyOptions::default(),
        }
    }
}

impl MapOptions {
    /// Parses options from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.check()?;
        Ok(options)
    }

    fn check(&self) -> Result<()> {
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(MapError::Config(format!(
                "world size must be positive, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(MapError::Config(format!(
                "minZoom {} is above maxZoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }

    /// The playable world
    pub fn map_bounds(&self) -> LatLngBounds {
        LatLngBounds::from_coords(0.0, 0.0, self.world_height, self.world_width)
    }

    /// The terrain image extent, which includes the ocean band added by the squish
    pub fn image_bounds(&self) -> LatLngBounds {
        LatLngBounds::from_coords(0.0, 0.0, self.world_height * HEX_SQUISH, self.world_width)
    }

    pub fn center(&self) -> LatLng {
        self.map_bounds().center()
    }
}

/// Options of the spiderfy declustering plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpiderfyOptions {
    /// Decimal digits kept when comparing marker positions
    pub precision: u32,
    /// Minimum distance between spread markers, in pixels
    pub foot_separation: f64,
    /// Minimum leg length, in pixels
    pub leg_length: f64,
    /// Groups spread only from this many members
    pub min_circle: usize,
    /// Stay spread until zoom (or until a map click when false)
    pub keep_spiderfied: bool,
    pub leg_color: String,
    pub leg_weight: f64,
}

impl Default for SpiderfyOptions {
    fn default() -> Self {
        Self {
            precision: 6,
            foot_separation: 28.0,
            leg_length: 35.0,
            min_circle: 2,
            keep_spiderfied: true,
            leg_color: "#222".to_string(),
            leg_weight: 1.0,
        }
    }
}

impl SpiderfyOptions {
    pub fn leg_style(&self) -> PathStyle {
        PathStyle {
            color: self.leg_color.clone(),
            weight: self.leg_weight,
            ..PathStyle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MapOptions::default();
        assert_eq!(options.world_width, 23040.0);
        assert_eq!(options.min_zoom, -6.0);
        assert_eq!(options.spiderfy.min_circle, 2);
        assert!(options.spiderfy.keep_spiderfied);
        assert_eq!(options.center(), LatLng::new(11520.0, 11520.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = MapOptions::from_json_str(
            r#"{ "maxZoom": 4, "spiderfy": { "keepSpiderfied": false, "legLength": 50 } }"#,
        )
        .unwrap();

        assert_eq!(options.max_zoom, 4.0);
        assert_eq!(options.min_zoom, -6.0);
        assert!(!options.spiderfy.keep_spiderfied);
        assert_eq!(options.spiderfy.leg_length, 50.0);
        assert_eq!(options.spiderfy.foot_separation, 28.0);
    }

    #[test]
    fn test_inverted_zoom_range_is_rejected() {
        let result = MapOptions::from_json_str(r#"{ "minZoom": 3, "maxZoom": 1 }"#);
        assert!(matches!(result, Err(MapError::Config(_))));
    }

    #[test]
    fn test_image_bounds_include_ocean() {
        let options = MapOptions::default();
        let image = options.image_bounds();
        assert!(image.north_east.lat > options.map_bounds().north_east.lat);
        assert_eq!(image.north_east.lng, 23040.0);
    }

    #[test]
    fn test_leg_style() {
        let style = SpiderfyOptions::default().leg_style();
        assert_eq!(style.color, "#222");
        assert_eq!(style.weight, 1.0);
    }
}
