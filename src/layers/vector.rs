use crate::{
    core::{
        constants::{DEFAULT_FILL_OPACITY, DEFAULT_PATH_COLOR, DEFAULT_PATH_WEIGHT},
        geo::{LatLng, LatLngBounds},
    },
    layers::marker::Marker,
    ui::popup::Popup,
};
use serde::{Deserialize, Serialize};

/// Handle of a primitive owned by the map context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveId(pub u64);

impl std::fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stroke and fill of paths and circle markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_PATH_COLOR.to_string(),
            weight: DEFAULT_PATH_WEIGHT,
            opacity: 1.0,
            fill_color: DEFAULT_PATH_COLOR.to_string(),
            fill_opacity: DEFAULT_FILL_OPACITY,
        }
    }
}

/// A fixed-pixel-radius circle drawn on the canvas renderer
#[derive(Debug, Clone, PartialEq)]
pub struct CircleMarker {
    pub position: LatLng,
    pub radius: f64,
    pub style: PathStyle,
    pub popup: Option<Popup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<LatLng>,
    pub style: PathStyle,
    pub popup: Option<Popup>,
}

/// A polygon; the first ring is the exterior, the rest are holes
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<LatLng>>,
    pub style: PathStyle,
    pub popup: Option<Popup>,
}

/// A label pinned to a position: a popup with no owning marker
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub position: LatLng,
    pub popup: Popup,
}

/// Everything the map can draw
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Marker(Marker),
    CircleMarker(CircleMarker),
    Polyline(Polyline),
    Polygon(Polygon),
    Tooltip(Tooltip),
}

impl Primitive {
    pub fn as_marker(&self) -> Option<&Marker> {
        match self {
            Primitive::Marker(marker) => Some(marker),
            _ => None,
        }
    }

    pub fn as_marker_mut(&mut self) -> Option<&mut Marker> {
        match self {
            Primitive::Marker(marker) => Some(marker),
            _ => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Primitive::Marker(_))
    }

    pub fn popup(&self) -> Option<&Popup> {
        match self {
            Primitive::Marker(marker) => marker.popup(),
            Primitive::CircleMarker(circle) => circle.popup.as_ref(),
            Primitive::Polyline(line) => line.popup.as_ref(),
            Primitive::Polygon(polygon) => polygon.popup.as_ref(),
            Primitive::Tooltip(tooltip) => Some(&tooltip.popup),
        }
    }

    /// Attaches a popup. A tooltip already is one, so its content is replaced.
    pub fn bind_popup(&mut self, popup: Popup) {
        match self {
            Primitive::Marker(marker) => marker.bind_popup(popup),
            Primitive::CircleMarker(circle) => circle.popup = Some(popup),
            Primitive::Polyline(line) => line.popup = Some(popup),
            Primitive::Polygon(polygon) => polygon.popup = Some(popup),
            Primitive::Tooltip(tooltip) => tooltip.popup.content = popup.content,
        }
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        match self {
            Primitive::Marker(marker) => Some(marker.bounds()),
            Primitive::CircleMarker(circle) => {
                Some(LatLngBounds::new(circle.position, circle.position))
            }
            Primitive::Polyline(line) => LatLngBounds::from_points(line.points.iter().copied()),
            Primitive::Polygon(polygon) => {
                LatLngBounds::from_points(polygon.rings.iter().flatten().copied())
            }
            Primitive::Tooltip(tooltip) => {
                Some(LatLngBounds::new(tooltip.position, tooltip.position))
            }
        }
    }
}
