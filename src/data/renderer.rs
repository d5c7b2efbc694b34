//! Turns validated features into map primitives.

use crate::{
    core::{
        constants::{
            DEFAULT_CIRCLE_RADIUS, DEFAULT_ICON, MARKER_ON_TOP_PANE, POPUP_ON_TOP_PANE,
        },
        geo::LatLng,
        map::{CameraAction, Map},
    },
    data::{
        geojson::{Feature, FeatureCollection, Geometry, Position},
        properties::{FeatureDisplay, FeatureProperties},
    },
    layers::{
        base::LayerKind,
        marker::Marker,
        vector::{CircleMarker, Polygon, Polyline, Primitive, PrimitiveId, Tooltip},
    },
    ui::popup::Popup,
};

/// What one render call did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub primitives: Vec<PrimitiveId>,
    /// Features without geometry
    pub skipped: usize,
    /// The camera action applied at the end, if any
    pub camera: Option<CameraAction>,
}

/// Draws validated GeoJSON into a registry layer.
///
/// Points become a pinned tooltip (`type: "tooltip"`), a circle marker
/// (`makeCanvas`) or an icon marker, in that order of precedence. Lines
/// and polygons become styled paths.
#[derive(Debug, Clone)]
pub struct FeatureRenderer {
    marker_pane: String,
    popup_pane: String,
}

impl Default for FeatureRenderer {
    fn default() -> Self {
        Self {
            marker_pane: MARKER_ON_TOP_PANE.to_string(),
            popup_pane: POPUP_ON_TOP_PANE.to_string(),
        }
    }
}

impl FeatureRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `collection` into the layer `layer_name`, creating it when
    /// missing, and shows the layer if `show` is set.
    ///
    /// Per feature: primitives are created, the popup is bound, then
    /// `turnLayerOn` and `turnLayerOff` are applied. One camera action is
    /// applied for the whole call; when several features ask for one, the
    /// last feature wins.
    pub fn render_into(
        &self,
        map: &mut Map,
        collection: &FeatureCollection,
        layer_name: &str,
        show: bool,
    ) -> RenderReport {
        map.create_layer(layer_name, LayerKind::GeoJson, serde_json::Value::Null, false);

        let mut report = RenderReport::default();
        let mut requested = None;
        for feature in &collection.features {
            let Some(geometry) = &feature.geometry else {
                report.skipped += 1;
                continue;
            };
            report
                .primitives
                .extend(self.render_feature(map, feature, geometry, layer_name));
            self.apply_layer_switches(map, &feature.properties);
            if let Some(action) = camera_request(&feature.properties) {
                requested = Some(action);
            }
        }

        if show {
            map.show_layer(layer_name);
        }

        report.camera = match requested {
            Some(Requested::FlyTo { center, zoom }) => Some(CameraAction::FlyTo { center, zoom }),
            Some(Requested::FitBounds) => collection
                .bounds()
                .filter(|bounds| bounds.is_valid())
                .map(CameraAction::FitBounds),
            None => None,
        };
        if let Some(action) = &report.camera {
            map.apply_camera(action.clone());
        }

        log::info!(
            "rendered {} primitives into '{}' ({} features without geometry)",
            report.primitives.len(),
            layer_name,
            report.skipped
        );
        report
    }

    fn render_feature(
        &self,
        map: &mut Map,
        feature: &Feature,
        geometry: &Geometry,
        layer_name: &str,
    ) -> Vec<PrimitiveId> {
        let properties = &feature.properties;
        let primitives = self.primitives_for(map, properties, geometry);

        let popup = properties
            .popup_text
            .as_ref()
            .map(|text| Popup::new(text.to_html()).with_pane(self.popup_pane.as_str()));

        primitives
            .into_iter()
            .filter_map(|mut primitive| {
                if let Some(popup) = &popup {
                    // a tooltip already carries its text
                    if !matches!(primitive, Primitive::Tooltip(_)) {
                        primitive.bind_popup(popup.clone());
                    }
                }
                map.add_primitive(layer_name, primitive)
            })
            .collect()
    }

    fn primitives_for(
        &self,
        map: &Map,
        properties: &FeatureProperties,
        geometry: &Geometry,
    ) -> Vec<Primitive> {
        match geometry {
            Geometry::Point { coordinates } => {
                vec![self.point(map, properties, (*coordinates).into())]
            }
            Geometry::MultiPoint { coordinates } => coordinates
                .iter()
                .map(|position| self.point(map, properties, (*position).into()))
                .collect(),
            Geometry::LineString { coordinates } => vec![polyline(properties, coordinates)],
            Geometry::MultiLineString { coordinates } => coordinates
                .iter()
                .map(|line| polyline(properties, line))
                .collect(),
            Geometry::Polygon { coordinates } => vec![polygon(properties, coordinates)],
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .map(|rings| polygon(properties, rings))
                .collect(),
            Geometry::GeometryCollection { geometries } => geometries
                .iter()
                .flat_map(|geometry| self.primitives_for(map, properties, geometry))
                .collect(),
        }
    }

    fn point(&self, map: &Map, properties: &FeatureProperties, position: LatLng) -> Primitive {
        match properties.display {
            FeatureDisplay::Tooltip => {
                let content = properties
                    .popup_text
                    .as_ref()
                    .map(|text| text.to_html())
                    .unwrap_or_default();
                Primitive::Tooltip(Tooltip {
                    position,
                    popup: Popup::new(content).pinned(),
                })
            }
            FeatureDisplay::Canvas { radius } => Primitive::CircleMarker(CircleMarker {
                position,
                radius: radius.unwrap_or(DEFAULT_CIRCLE_RADIUS),
                style: properties.style.resolve(),
                popup: None,
            }),
            FeatureDisplay::Icon => {
                let name = properties.icon_name.as_deref().unwrap_or(DEFAULT_ICON);
                let icon = map.icons().icon(name, properties.icon_size);
                Primitive::Marker(
                    Marker::new(position, icon).with_pane(self.marker_pane.as_str()),
                )
            }
        }
    }

    fn apply_layer_switches(&self, map: &mut Map, properties: &FeatureProperties) {
        for name in &properties.turn_layer_on {
            if !map.show_layer(name) {
                log::debug!("turnLayerOn: unknown layer '{}'", name);
            }
        }
        for name in &properties.turn_layer_off {
            if !map.hide_layer(name) {
                log::debug!("turnLayerOff: unknown layer '{}'", name);
            }
        }
    }
}

enum Requested {
    FlyTo { center: LatLng, zoom: f64 },
    FitBounds,
}

fn camera_request(properties: &FeatureProperties) -> Option<Requested> {
    if properties.no_pan {
        return None;
    }
    match (properties.fly_to, properties.zoom_to) {
        (Some(center), Some(zoom)) => Some(Requested::FlyTo { center, zoom }),
        _ => Some(Requested::FitBounds),
    }
}

fn polyline(properties: &FeatureProperties, positions: &[Position]) -> Primitive {
    Primitive::Polyline(Polyline {
        points: Geometry::line(positions),
        style: properties.style.resolve(),
        popup: None,
    })
}

fn polygon(properties: &FeatureProperties, rings: &[Vec<Position>]) -> Primitive {
    Primitive::Polygon(Polygon {
        rings: Geometry::rings(rings),
        style: properties.style.resolve(),
        popup: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{config::MapOptions, constants::WAYPOINTS_LAYER},
        data::validate::validate,
    };

    fn render(doc: &str) -> (Map, RenderReport) {
        let mut map = Map::new(MapOptions::default());
        let collection = validate(doc, map.icons()).unwrap();
        let report = FeatureRenderer::new().render_into(&mut map, &collection, WAYPOINTS_LAYER, true);
        (map, report)
    }

    #[test]
    fn test_primitive_precedence() {
        let (map, report) = render(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},
                 "properties":{"type":"tooltip","makeCanvas":true,"popupText":"label"}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[3,4]},
                 "properties":{"makeCanvas":true}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[5,6]},
                 "properties":{"makeCanvas":true,"radius":7}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[7,8]},
                 "properties":{"iconName":"temple","iconSize":[10,20]}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[9,10]}}
            ]}"#,
        );
        let drawn: Vec<_> = report
            .primitives
            .iter()
            .map(|id| map.primitive(*id).unwrap())
            .collect();

        match drawn[0] {
            Primitive::Tooltip(tooltip) => {
                assert_eq!(tooltip.position, LatLng::new(2.0, 1.0));
                assert_eq!(tooltip.popup.content, "label");
                assert!(!tooltip.popup.options.auto_pan);
                assert!(!tooltip.popup.options.auto_close);
            }
            other => panic!("expected a tooltip, got {:?}", other),
        }
        match drawn[1] {
            Primitive::CircleMarker(circle) => assert_eq!(circle.radius, 1.0),
            other => panic!("expected a circle, got {:?}", other),
        }
        match drawn[2] {
            Primitive::CircleMarker(circle) => assert_eq!(circle.radius, 7.0),
            other => panic!("expected a circle, got {:?}", other),
        }
        let temple = drawn[3].as_marker().unwrap();
        assert_eq!(temple.icon().name, "temple");
        assert_eq!(temple.icon().size, [10.0, 20.0]);
        assert_eq!(temple.pane(), Some(MARKER_ON_TOP_PANE));
        let waypoint = drawn[4].as_marker().unwrap();
        assert_eq!(waypoint.icon().name, "waypoint");
        assert_eq!(waypoint.icon().size, [32.0, 32.0]);
    }

    #[test]
    fn test_popup_lines_are_joined() {
        let (map, report) = render(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},
                 "properties":{"popupText":["<b>Camp</b>","second"]}}
            ]}"#,
        );
        let popup = map.primitive(report.primitives[0]).unwrap().popup().unwrap();
        assert_eq!(popup.content, "&lt;b&gt;Camp&lt;/b&gt;<br>second");
        assert_eq!(popup.options.pane.as_deref(), Some(POPUP_ON_TOP_PANE));
    }

    #[test]
    fn test_paths_take_style() {
        let (map, report) = render(
            r##"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[10,10]]},
                 "properties":{"color":"#ff0000","weight":0,"fillOpacity":0}},
                {"type":"Feature","geometry":{"type":"MultiPolygon","coordinates":[
                    [[[0,0],[1,0],[1,1],[0,0]]],
                    [[[5,5],[6,5],[6,6],[5,5]]]
                ]}}
            ]}"##,
        );
        assert_eq!(report.primitives.len(), 3);
        match map.primitive(report.primitives[0]).unwrap() {
            Primitive::Polyline(line) => {
                assert_eq!(line.points, vec![LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)]);
                assert_eq!(line.style.color, "#ff0000");
                assert_eq!(line.style.weight, 3.0);
                assert_eq!(line.style.fill_opacity, 0.0);
            }
            other => panic!("expected a polyline, got {:?}", other),
        }
        assert!(matches!(
            map.primitive(report.primitives[2]).unwrap(),
            Primitive::Polygon(_)
        ));
    }

    #[test]
    fn test_layer_switches() {
        let (map, _) = render(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},
                 "properties":{"turnLayerOn":["claimT3Layer","notALayer"],"turnLayerOff":"treesLayer","noPan":true}}
            ]}"#,
        );
        assert!(map.is_layer_visible("claimT3Layer"));
        assert!(!map.is_layer_visible("treesLayer"));
        assert!(!map.registry().has("notALayer"));
        assert!(map.is_layer_visible(WAYPOINTS_LAYER));
    }

    #[test]
    fn test_last_camera_request_wins() {
        let (map, report) = render(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[100,200]},
                 "properties":{"flyTo":[1000,2000],"zoomTo":2}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[300,400]}}
            ]}"#,
        );
        // the second feature asks for a fit, overriding the fly-to
        match report.camera {
            Some(CameraAction::FitBounds(bounds)) => {
                assert_eq!(bounds.south_west, LatLng::new(200.0, 100.0));
                assert_eq!(bounds.north_east, LatLng::new(400.0, 300.0));
            }
            other => panic!("expected a fit, got {:?}", other),
        }
        assert_eq!(map.camera(), report.camera.as_ref());
    }

    #[test]
    fn test_fly_to() {
        let (map, report) = render(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[100,200]},
                 "properties":{"flyTo":[1000,2000],"zoomTo":2}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[300,400]},"properties":{"noPan":1}}
            ]}"#,
        );
        assert_eq!(
            report.camera,
            Some(CameraAction::FlyTo {
                center: LatLng::new(1000.0, 2000.0),
                zoom: 2.0
            })
        );
        assert_eq!(map.viewport().center, LatLng::new(1000.0, 2000.0));
        assert_eq!(map.viewport().zoom, 2.0);
    }

    #[test]
    fn test_no_pan_everywhere_keeps_the_view() {
        let (map, report) = render(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{"noPan":true}},
                {"type":"Feature","properties":{}}
            ]}"#,
        );
        assert_eq!(report.camera, None);
        assert_eq!(report.skipped, 1);
        assert_eq!(map.camera(), None);
    }

    #[test]
    fn test_hidden_target_layer() {
        let mut map = Map::new(MapOptions::default());
        let collection = validate(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{"noPan":true}}
            ]}"#,
            map.icons(),
        )
        .unwrap();
        let report = FeatureRenderer::new().render_into(&mut map, &collection, "gridsLayer", false);
        assert!(!map.is_layer_visible("gridsLayer"));
        assert!(!map.is_attached(report.primitives[0]));
        assert_eq!(map.layer_primitives("gridsLayer").len(), 1);
    }
}
