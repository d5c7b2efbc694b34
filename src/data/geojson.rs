use crate::{
    core::geo::{LatLng, LatLngBounds},
    data::properties::FeatureProperties,
};
use serde::{Deserialize, Serialize};

/// A GeoJSON position. Extra ordinates (altitude) are accepted and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position(pub [f64; 2]);

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [x, y, ..] => Ok(Position([*x, *y])),
            _ => Err(format!(
                "a position needs at least 2 numbers, got {}",
                values.len()
            )),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl From<Position> for LatLng {
    fn from(position: Position) -> Self {
        LatLng::from_geojson(position.0)
    }
}

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

fn to_lat_lngs(positions: &[Position]) -> Vec<LatLng> {
    positions.iter().copied().map(LatLng::from).collect()
}

impl Geometry {
    /// Every position of the geometry, converted to map coordinates
    pub fn to_lat_lng_points(&self) -> Vec<LatLng> {
        match self {
            Geometry::Point { coordinates } => vec![(*coordinates).into()],
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                to_lat_lngs(coordinates)
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                coordinates.iter().flat_map(|ring| to_lat_lngs(ring)).collect()
            }
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flatten()
                .flat_map(|ring| to_lat_lngs(ring))
                .collect(),
            Geometry::GeometryCollection { geometries } => geometries
                .iter()
                .flat_map(Geometry::to_lat_lng_points)
                .collect(),
        }
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.to_lat_lng_points())
    }

    pub(crate) fn rings(rings: &[Vec<Position>]) -> Vec<Vec<LatLng>> {
        rings.iter().map(|ring| to_lat_lngs(ring)).collect()
    }

    pub(crate) fn line(positions: &[Position]) -> Vec<LatLng> {
        to_lat_lngs(positions)
    }
}

/// A validated feature: typed geometry and sanitized properties
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<serde_json::Value>,
    /// Features without geometry are kept but draw nothing
    pub geometry: Option<Geometry>,
    pub properties: FeatureProperties,
}

/// A validated `FeatureCollection`, features in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Gets the bounding box of all features
    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(
            self.features
                .iter()
                .filter_map(|feature| feature.geometry.as_ref())
                .flat_map(Geometry::to_lat_lng_points),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_geometry() {
        let geometry: Geometry =
            serde_json::from_str(r#"{"type": "Point", "coordinates": [100.0, 200.0]}"#).unwrap();

        let points = geometry.to_lat_lng_points();
        assert_eq!(points, vec![LatLng::new(200.0, 100.0)]);
    }

    #[test]
    fn test_position_with_altitude() {
        let geometry: Geometry =
            serde_json::from_str(r#"{"type": "Point", "coordinates": [1, 2, 3]}"#).unwrap();
        assert_eq!(geometry.to_lat_lng_points(), vec![LatLng::new(2.0, 1.0)]);
    }

    #[test]
    fn test_short_position_is_rejected() {
        let result = serde_json::from_str::<Geometry>(r#"{"type": "Point", "coordinates": [1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_polygon_bounds() {
        let geometry: Geometry = serde_json::from_str(
            r#"{"type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 5], [0, 0]]]}"#,
        )
        .unwrap();
        let bounds = geometry.bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(0.0, 0.0));
        assert_eq!(bounds.north_east, LatLng::new(5.0, 10.0));
    }

    #[test]
    fn test_geometry_collection_points() {
        let geometry: Geometry = serde_json::from_str(
            r#"{"type": "GeometryCollection", "geometries": [
                {"type": "Point", "coordinates": [1, 1]},
                {"type": "LineString", "coordinates": [[2, 2], [3, 3]]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(geometry.to_lat_lng_points().len(), 3);
    }
}
