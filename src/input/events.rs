use crate::{core::geo::LatLng, layers::vector::PrimitiveId};
use serde::{Deserialize, Serialize};

/// Events the host surface reports to the map, and the layer notifications
/// the map raises itself when primitives are attached or detached.
///
/// Hosts talking JSON send them tagged, e.g.
/// `{"type": "markerClick", "marker": 3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MapEvent {
    /// Click on an icon marker
    MarkerClick { marker: PrimitiveId },
    /// Click on the map background
    Click { lat_lng: LatLng },
    /// Pointer moved over the map
    MouseMove { lat_lng: LatLng },
    /// The viewport is about to change zoom
    ZoomStart { zoom: f64 },
    /// The host finished a pan or zoom and settled on this view
    ViewChange { center: LatLng, zoom: f64 },
    /// A primitive was attached to the surface
    LayerAdd { primitive: PrimitiveId },
    /// A primitive was detached from the surface
    LayerRemove { primitive: PrimitiveId },
    /// The user closed a popup
    PopupClose { primitive: PrimitiveId },
}

impl MapEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MapEvent::MarkerClick { .. } => "markerclick",
            MapEvent::Click { .. } => "click",
            MapEvent::MouseMove { .. } => "mousemove",
            MapEvent::ZoomStart { .. } => "zoomstart",
            MapEvent::ViewChange { .. } => "moveend",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::PopupClose { .. } => "popupclose",
        }
    }

    /// The primitive the event is about, if any
    pub fn primitive(&self) -> Option<PrimitiveId> {
        match self {
            MapEvent::MarkerClick { marker } => Some(*marker),
            MapEvent::LayerAdd { primitive }
            | MapEvent::LayerRemove { primitive }
            | MapEvent::PopupClose { primitive } => Some(*primitive),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_from_host_json() {
        let event: MapEvent = serde_json::from_str(r#"{"type":"markerClick","marker":3}"#).unwrap();
        assert_eq!(
            event,
            MapEvent::MarkerClick {
                marker: PrimitiveId(3)
            }
        );
        assert_eq!(event.primitive(), Some(PrimitiveId(3)));

        let event: MapEvent =
            serde_json::from_str(r#"{"type":"click","latLng":{"lat":1.0,"lng":2.0}}"#).unwrap();
        assert_eq!(
            event,
            MapEvent::Click {
                lat_lng: LatLng::new(1.0, 2.0)
            }
        );
        assert_eq!(event.name(), "click");
        assert_eq!(event.primitive(), None);

        let event: MapEvent = serde_json::from_str(
            r#"{"type":"viewChange","center":{"lat":5.0,"lng":6.0},"zoom":-2.5}"#,
        )
        .unwrap();
        assert_eq!(event.name(), "moveend");
    }

    #[test]
    fn test_fields_are_camel_case_on_the_wire() {
        let json = serde_json::to_value(MapEvent::MouseMove {
            lat_lng: LatLng::new(1.0, 2.0),
        })
        .unwrap();
        assert_eq!(json["type"], "mouseMove");
        assert_eq!(json["latLng"]["lng"], 2.0);
        assert!(json.get("lat_lng").is_none());
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(serde_json::from_str::<MapEvent>(r#"{"type":"dragEnd"}"#).is_err());
    }
}
