//! Typed feature properties.
//!
//! User GeoJSON carries arbitrary property bags. They are turned into
//! [`FeatureProperties`] once, during validation: out-of-contract values are
//! replaced by defaults or dropped, and `popupText` is HTML-escaped. The
//! renderer only ever sees the typed form.
//!
//! Presence checks follow the page's JavaScript truthiness: `null`, `false`,
//! `0` and `""` count as absent.

use crate::{
    core::{
        constants::{DEFAULT_ICON, DEFAULT_ICON_SIZE, POPUP_LINE_BREAK},
        geo::LatLng,
    },
    data::validate::escape_html,
    layers::{icon::IconManifest, vector::PathStyle},
    FormatError,
};
use serde_json::{Map, Value};

/// How a point feature is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureDisplay {
    /// `type: "tooltip"`: a pinned label, no marker
    Tooltip,
    /// `makeCanvas`: a small circle marker
    Canvas { radius: Option<f64> },
    /// An icon marker
    Icon,
}

/// Escaped popup content
#[derive(Debug, Clone, PartialEq)]
pub enum PopupText {
    Single(String),
    Lines(Vec<String>),
}

impl PopupText {
    /// Lines are joined with `<br>`.
    pub fn to_html(&self) -> String {
        match self {
            PopupText::Single(text) => text.clone(),
            PopupText::Lines(lines) => lines.join(POPUP_LINE_BREAK),
        }
    }
}

/// Path style properties as given by the feature; unset fields use defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverrides {
    pub color: Option<String>,
    pub weight: Option<f64>,
    pub opacity: Option<f64>,
    pub fill_color: Option<String>,
    pub fill_opacity: Option<f64>,
}

impl StyleOverrides {
    pub fn resolve(&self) -> PathStyle {
        let defaults = PathStyle::default();
        PathStyle {
            color: self.color.clone().unwrap_or(defaults.color),
            weight: self.weight.unwrap_or(defaults.weight),
            opacity: self.opacity.unwrap_or(defaults.opacity),
            fill_color: self.fill_color.clone().unwrap_or(defaults.fill_color),
            fill_opacity: self.fill_opacity.unwrap_or(defaults.fill_opacity),
        }
    }
}

/// The recognized properties of a validated feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureProperties {
    pub display: FeatureDisplay,
    /// Always a manifest key when set
    pub icon_name: Option<String>,
    pub icon_size: Option<[f64; 2]>,
    pub popup_text: Option<PopupText>,
    pub turn_layer_on: Vec<String>,
    pub turn_layer_off: Vec<String>,
    pub fly_to: Option<LatLng>,
    pub zoom_to: Option<f64>,
    pub no_pan: bool,
    pub style: StyleOverrides,
    /// Unrecognized properties, untouched (`name`, `tier`, ...)
    pub extra: Map<String, Value>,
}

impl Default for FeatureProperties {
    fn default() -> Self {
        Self {
            display: FeatureDisplay::Icon,
            icon_name: None,
            icon_size: None,
            popup_text: None,
            turn_layer_on: Vec::new(),
            turn_layer_off: Vec::new(),
            fly_to: None,
            zoom_to: None,
            no_pan: false,
            style: StyleOverrides::default(),
            extra: Map::new(),
        }
    }
}

const RECOGNIZED: &[&str] = &[
    "type",
    "makeCanvas",
    "radius",
    "iconName",
    "iconSize",
    "popupText",
    "turnLayerOn",
    "turnLayerOff",
    "flyTo",
    "zoomTo",
    "noPan",
    "color",
    "weight",
    "opacity",
    "fillColor",
    "fillOpacity",
];

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| is_truthy(value))
}

fn non_zero_number(raw: &Map<String, Value>, key: &str) -> Option<f64> {
    truthy(raw, key).and_then(Value::as_f64)
}

fn non_empty_string(raw: &Map<String, Value>, key: &str) -> Option<String> {
    truthy(raw, key).and_then(Value::as_str).map(str::to_string)
}

fn layer_names(raw: &Map<String, Value>, key: &str) -> Vec<String> {
    match truthy(raw, key) {
        Some(Value::String(name)) => vec![name.clone()],
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn icon_name(raw: &Map<String, Value>, icons: &IconManifest) -> Option<String> {
    let value = truthy(raw, "iconName")?;
    match value.as_str() {
        Some(name) if icons.contains(name) => Some(name.to_string()),
        _ => {
            log::warn!("unknown iconName {}, using '{}'", value, DEFAULT_ICON);
            Some(DEFAULT_ICON.to_string())
        }
    }
}

fn icon_size(raw: &Map<String, Value>) -> Option<[f64; 2]> {
    let value = truthy(raw, "iconSize")?;
    let size = match value.as_array().map(Vec::as_slice) {
        Some([w, h]) => w.as_f64().zip(h.as_f64()).map(|(w, h)| [w, h]),
        _ => None,
    };
    if size.is_none() {
        log::warn!("invalid iconSize {}, using {:?}", value, DEFAULT_ICON_SIZE);
    }
    Some(size.unwrap_or(DEFAULT_ICON_SIZE))
}

fn popup_text(raw: &Map<String, Value>, index: usize) -> Result<Option<PopupText>, FormatError> {
    match truthy(raw, "popupText") {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(PopupText::Single(escape_html(text)))),
        Some(Value::Array(lines)) => lines
            .iter()
            .map(|line| line.as_str().map(escape_html))
            .collect::<Option<Vec<_>>>()
            .map(|lines| Some(PopupText::Lines(lines)))
            .ok_or(FormatError::InvalidPopupText { index }),
        Some(_) => Err(FormatError::InvalidPopupText { index }),
    }
}

/// `[lat, lng]` or `{ "lat": .., "lng": .. }`
fn fly_to(raw: &Map<String, Value>) -> Option<LatLng> {
    match truthy(raw, "flyTo")? {
        Value::Array(pair) => match pair.as_slice() {
            [lat, lng] => Some(LatLng::new(lat.as_f64()?, lng.as_f64()?)),
            _ => None,
        },
        Value::Object(obj) => Some(LatLng::new(
            obj.get("lat")?.as_f64()?,
            obj.get("lng")?.as_f64()?,
        )),
        _ => None,
    }
}

fn display(raw: &Map<String, Value>) -> FeatureDisplay {
    if raw.get("type").and_then(Value::as_str) == Some("tooltip") {
        FeatureDisplay::Tooltip
    } else if truthy(raw, "makeCanvas").is_some() {
        FeatureDisplay::Canvas {
            radius: non_zero_number(raw, "radius").filter(|r| *r > 0.0),
        }
    } else {
        FeatureDisplay::Icon
    }
}

impl FeatureProperties {
    /// Sanitizes the property bag of feature `index`.
    ///
    /// Only an unusable `popupText` is an error; everything else degrades
    /// to a default.
    pub fn from_raw(
        raw: &Map<String, Value>,
        icons: &IconManifest,
        index: usize,
    ) -> Result<Self, FormatError> {
        let extra = raw
            .iter()
            .filter(|(key, _)| !RECOGNIZED.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            display: display(raw),
            icon_name: icon_name(raw, icons),
            icon_size: icon_size(raw),
            popup_text: popup_text(raw, index)?,
            turn_layer_on: layer_names(raw, "turnLayerOn"),
            turn_layer_off: layer_names(raw, "turnLayerOff"),
            fly_to: fly_to(raw),
            zoom_to: non_zero_number(raw, "zoomTo"),
            no_pan: truthy(raw, "noPan").is_some(),
            style: StyleOverrides {
                color: non_empty_string(raw, "color"),
                weight: non_zero_number(raw, "weight"),
                opacity: non_zero_number(raw, "opacity"),
                fill_color: non_empty_string(raw, "fillColor"),
                fill_opacity: raw.get("fillOpacity").and_then(Value::as_f64),
            },
            extra,
        })
    }

    /// A string property outside the recognized set, e.g. `name`
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn extra_bool(&self, key: &str) -> bool {
        self.extra.get(key).is_some_and(is_truthy)
    }

    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(Value::as_u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<FeatureProperties, FormatError> {
        let raw = value.as_object().cloned().unwrap_or_default();
        FeatureProperties::from_raw(&raw, &IconManifest::builtin(), 0)
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!("0")));
    }

    #[test]
    fn test_unknown_icon_name_becomes_default() {
        let props = parse(json!({ "iconName": "doesNotExist" })).unwrap();
        assert_eq!(props.icon_name.as_deref(), Some("waypoint"));

        let props = parse(json!({ "iconName": 12 })).unwrap();
        assert_eq!(props.icon_name.as_deref(), Some("waypoint"));

        let props = parse(json!({ "iconName": "temple" })).unwrap();
        assert_eq!(props.icon_name.as_deref(), Some("temple"));

        let props = parse(json!({})).unwrap();
        assert_eq!(props.icon_name, None);
    }

    #[test]
    fn test_bad_icon_size_becomes_default() {
        for bad in [json!("bad"), json!([1, 2, 3]), json!([1, "2"]), json!({ "w": 1 })] {
            let props = parse(json!({ "iconSize": bad })).unwrap();
            assert_eq!(props.icon_size, Some([32.0, 32.0]));
        }
        let props = parse(json!({ "iconSize": [48, 24] })).unwrap();
        assert_eq!(props.icon_size, Some([48.0, 24.0]));
    }

    #[test]
    fn test_popup_text_is_escaped() {
        let props = parse(json!({ "popupText": "<b>Camp</b>" })).unwrap();
        assert_eq!(
            props.popup_text,
            Some(PopupText::Single("&lt;b&gt;Camp&lt;/b&gt;".to_string()))
        );

        let props = parse(json!({ "popupText": ["a & b", "'c'"] })).unwrap();
        assert_eq!(
            props.popup_text.unwrap().to_html(),
            "a &amp; b<br>&#x27;c&#x27;"
        );
    }

    #[test]
    fn test_popup_text_wrong_shape_fails() {
        assert!(matches!(
            parse(json!({ "popupText": ["ok", 3] })),
            Err(FormatError::InvalidPopupText { index: 0 })
        ));
        assert!(parse(json!({ "popupText": { "text": "x" } })).is_err());
        assert!(parse(json!({ "popupText": true })).is_err());
        // falsy values count as absent
        assert_eq!(parse(json!({ "popupText": "" })).unwrap().popup_text, None);
    }

    #[test]
    fn test_layer_names() {
        let props = parse(json!({
            "turnLayerOn": "treesLayer",
            "turnLayerOff": ["claimT1Layer", 4, "caveT2Layer"]
        }))
        .unwrap();
        assert_eq!(props.turn_layer_on, vec!["treesLayer"]);
        assert_eq!(props.turn_layer_off, vec!["claimT1Layer", "caveT2Layer"]);
    }

    #[test]
    fn test_camera_directives() {
        let props = parse(json!({ "flyTo": [100, 200], "zoomTo": 3, "noPan": 1 })).unwrap();
        assert_eq!(props.fly_to, Some(LatLng::new(100.0, 200.0)));
        assert_eq!(props.zoom_to, Some(3.0));
        assert!(props.no_pan);

        let props = parse(json!({ "flyTo": { "lat": 1, "lng": 2 } })).unwrap();
        assert_eq!(props.fly_to, Some(LatLng::new(1.0, 2.0)));

        let props = parse(json!({ "flyTo": [1], "zoomTo": "3" })).unwrap();
        assert_eq!(props.fly_to, None);
        assert_eq!(props.zoom_to, None);
    }

    #[test]
    fn test_display_precedence() {
        let props = parse(json!({ "type": "tooltip", "makeCanvas": true })).unwrap();
        assert_eq!(props.display, FeatureDisplay::Tooltip);

        let props = parse(json!({ "makeCanvas": true, "radius": 4 })).unwrap();
        assert_eq!(props.display, FeatureDisplay::Canvas { radius: Some(4.0) });

        let props = parse(json!({ "makeCanvas": 1 })).unwrap();
        assert_eq!(props.display, FeatureDisplay::Canvas { radius: None });

        let props = parse(json!({ "makeCanvas": false })).unwrap();
        assert_eq!(props.display, FeatureDisplay::Icon);
    }

    #[test]
    fn test_style_fallbacks() {
        let props = parse(json!({
            "color": "#ff0000",
            "weight": 0,
            "opacity": 0,
            "fillOpacity": 0
        }))
        .unwrap();
        let style = props.style.resolve();
        assert_eq!(style.color, "#ff0000");
        assert_eq!(style.weight, 3.0);
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.fill_color, "#3388ff");
        assert_eq!(style.fill_opacity, 0.0);
    }

    #[test]
    fn test_extra_properties_are_kept() {
        let props = parse(json!({ "name": "Camp", "tier": 3, "has_bank": true, "iconName": "temple" }))
            .unwrap();
        assert_eq!(props.extra_str("name"), Some("Camp"));
        assert_eq!(props.extra_u64("tier"), Some(3));
        assert!(props.extra_bool("has_bank"));
        assert!(!props.extra.contains_key("iconName"));
    }
}
