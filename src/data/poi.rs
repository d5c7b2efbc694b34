//! Loaders for the static point-of-interest files shipped with the page.
//!
//! These files are generated by the data pipeline, so they are parsed
//! directly instead of going through untrusted-input validation. Grids are
//! the exception: they are drawn by the feature renderer and validated
//! like user input.

use crate::{
    core::{
        constants::{
            BANKS_LAYER, CAVE_TIERS, CLAIM_TIERS, CLAIM_URL_PREFIX, GRIDS_LAYER, MARKETS_LAYER,
            POPUP_LINE_BREAK, RUINED_LAYER, TEMPLES_LAYER, TREES_LAYER, WAYPOINTS_LAYER,
            WAYSTONES_LAYER,
        },
        geo::LatLng,
        map::Map,
        projection::readable_coordinates,
    },
    data::{
        geojson::Geometry,
        properties::is_truthy,
        renderer::FeatureRenderer,
        validate::{escape_html, validate},
    },
    layers::{marker::Marker, vector::Primitive},
    ui::popup::Popup,
    Result,
};
use serde::Deserialize;
use serde_json::Value;

/// Layer of the claims of one tier (0 to 10)
pub fn claim_layer(tier: u64) -> String {
    format!("claimT{}Layer", tier)
}

/// Layer of the caves of one tier (1 to 10)
pub fn cave_layer(tier: u64) -> String {
    format!("caveT{}Layer", tier)
}

/// Every marker layer of the page, in toggle-panel order
pub fn page_layers() -> Vec<String> {
    let mut layers: Vec<String> = [
        TREES_LAYER,
        TEMPLES_LAYER,
        RUINED_LAYER,
        BANKS_LAYER,
        MARKETS_LAYER,
        WAYSTONES_LAYER,
        GRIDS_LAYER,
        WAYPOINTS_LAYER,
    ]
    .iter()
    .map(|name| name.to_string())
    .collect();
    layers.extend(CLAIM_TIERS.map(claim_layer));
    layers.extend(CAVE_TIERS.map(cave_layer));
    layers
}

/// A static marker file and how its features are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoiCategory {
    Trees,
    Temples,
    Ruined,
    Caves,
    Claims,
    Grids,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 6] = [
        PoiCategory::Trees,
        PoiCategory::Temples,
        PoiCategory::Ruined,
        PoiCategory::Caves,
        PoiCategory::Claims,
        PoiCategory::Grids,
    ];

    /// File name under the markers directory
    pub fn file_name(&self) -> &'static str {
        match self {
            PoiCategory::Trees => "trees.geojson",
            PoiCategory::Temples => "temples.geojson",
            PoiCategory::Ruined => "ruined.geojson",
            PoiCategory::Caves => "caves.geojson",
            PoiCategory::Claims => "claims.geojson",
            PoiCategory::Grids => "grids.geojson",
        }
    }

    /// Adds the file's features to the map; returns how many primitives
    /// were drawn.
    pub fn load(&self, map: &mut Map, text: &str) -> Result<usize> {
        if *self == PoiCategory::Grids {
            let collection = validate(text, map.icons())?;
            let report = FeatureRenderer::new().render_into(map, &collection, GRIDS_LAYER, false);
            return Ok(report.primitives.len());
        }

        let file: PoiFile = serde_json::from_str(text)?;
        let mut added = 0;
        for (index, feature) in file.features.into_iter().enumerate() {
            let geometry = feature.geometry.map(serde_json::from_value::<Geometry>);
            let Some(Ok(Geometry::Point { coordinates })) = geometry else {
                log::debug!("{}: feature {} is not a point, skipped", self, index);
                continue;
            };
            let properties = feature.properties.unwrap_or_default();
            if self.add_marker(map, coordinates.into(), &properties) {
                added += 1;
            } else {
                log::warn!(
                    "{}: feature {} has no usable tier ({:?}), skipped",
                    self,
                    index,
                    properties.tier
                );
            }
        }
        log::info!("{}: {} markers loaded", self, added);
        Ok(added)
    }

    fn add_marker(&self, map: &mut Map, position: LatLng, properties: &PoiProperties) -> bool {
        let name = escape_html(&properties.name());
        let [north, east] = readable_coordinates(&position);
        let location = format!("N {} E {}", north, east);
        let title = format!("{} {}", name, location);
        let popup = format!("{}{}{}", name, POPUP_LINE_BREAK, location);

        let (icon, layer, titled) = match self {
            PoiCategory::Trees => ("travelerTree".to_string(), TREES_LAYER.to_string(), false),
            PoiCategory::Temples => ("temple".to_string(), TEMPLES_LAYER.to_string(), false),
            PoiCategory::Ruined => ("ruinedCity".to_string(), RUINED_LAYER.to_string(), true),
            PoiCategory::Caves => match properties.tier().filter(|t| CAVE_TIERS.contains(t)) {
                Some(tier) => (format!("t{}", tier), cave_layer(tier), false),
                None => return false,
            },
            PoiCategory::Claims => {
                let Some(tier) = properties.tier().filter(|t| CLAIM_TIERS.contains(t)) else {
                    return false;
                };
                return add_claim(map, position, properties, tier, &name, &location, title);
            }
            PoiCategory::Grids => return false,
        };

        let mut marker =
            Marker::new(position, map.icons().icon(&icon, None)).with_popup(Popup::new(popup));
        if titled {
            marker = marker.with_title(title);
        }
        map.add_primitive(&layer, Primitive::Marker(marker)).is_some()
    }
}

impl std::fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PoiCategory::Trees => "trees",
            PoiCategory::Temples => "temples",
            PoiCategory::Ruined => "ruined cities",
            PoiCategory::Caves => "caves",
            PoiCategory::Claims => "claims",
            PoiCategory::Grids => "grids",
        };
        write!(f, "{}", name)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// A claim goes to its tier layer and, when it has them, to the bank,
/// market and waystone layers as the same marker.
fn add_claim(
    map: &mut Map,
    position: LatLng,
    properties: &PoiProperties,
    tier: u64,
    name: &str,
    location: &str,
    title: String,
) -> bool {
    let entity_id = match &properties.entity_id {
        Some(Value::String(id)) => escape_html(id),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let has_bank = flag(&properties.has_bank);
    let has_market = flag(&properties.has_market);
    let has_waystone = flag(&properties.has_waystone);

    let popup = [
        format!(
            "<a href=\"{}{}\" target=\"_blank\">{}</a> (T{})",
            CLAIM_URL_PREFIX, entity_id, name, tier
        ),
        location.to_string(),
        format!("Bank : {}", yes_no(has_bank)),
        format!("Market : {}", yes_no(has_market)),
        format!("Waystone : {}", yes_no(has_waystone)),
    ]
    .join(POPUP_LINE_BREAK);

    let icon = map.icons().icon(&format!("claimT{}", tier), None);
    let marker = Marker::new(position, icon)
        .with_title(title)
        .with_popup(Popup::new(popup));
    let Some(id) = map.add_primitive(&claim_layer(tier), Primitive::Marker(marker)) else {
        return false;
    };

    for (flag, layer) in [
        (has_bank, BANKS_LAYER),
        (has_market, MARKETS_LAYER),
        (has_waystone, WAYSTONES_LAYER),
    ] {
        if flag {
            map.add_to_layer(layer, id);
        }
    }
    true
}

#[derive(Debug, Deserialize)]
struct PoiFile {
    features: Vec<PoiFeature>,
}

#[derive(Debug, Deserialize)]
struct PoiFeature {
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<PoiProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PoiProperties {
    name: Option<Value>,
    tier: Option<Value>,
    #[serde(rename = "entityId")]
    entity_id: Option<Value>,
    has_bank: Option<Value>,
    has_market: Option<Value>,
    has_waystone: Option<Value>,
}

impl PoiProperties {
    fn name(&self) -> String {
        match &self.name {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Whole-number tiers, whether written as integers, floats or strings
    fn tier(&self) -> Option<u64> {
        match self.tier.as_ref()? {
            Value::Number(number) => number.as_u64().or_else(|| {
                number
                    .as_f64()
                    .filter(|tier| *tier >= 0.0 && tier.fract() == 0.0)
                    .map(|tier| tier as u64)
            }),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

fn flag(value: &Option<Value>) -> bool {
    value.as_ref().is_some_and(is_truthy)
}
