//! # bitcraft-map
//!
//! The host-agnostic core of the BitCraft world map viewer.
//!
//! This crate projects in-game coordinates onto the map plane, keeps a
//! registry of togglable marker layers, ingests (untrusted) GeoJSON from
//! static assets, the page URL or a gist, and declutters stacked markers
//! with a spiderfy state machine. Actual drawing is left to the host: it
//! feeds [`MapEvent`]s in and reads primitives, popups and camera state out.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod sources;
pub mod spatial;
pub mod ui;
pub mod prelude;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{MapOptions, SpiderfyOptions},
    geo::{GameCoord, LatLng, LatLngBounds, Point},
    map::Map,
    projection::HexProjection,
    viewport::Viewport,
};

pub use layers::{
    base::{Layer, LayerKind},
    icon::{Icon, IconManifest},
    marker::Marker,
    registry::LayerRegistry,
    vector::{Primitive, PrimitiveId},
};

pub use data::{
    geojson::{Feature, FeatureCollection},
    renderer::FeatureRenderer,
    validate::{escape_html, validate},
};

pub use input::events::MapEvent;

pub use spatial::spiderfy::{SpiderHost, Spiderfy};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Rejection of a user-supplied GeoJSON document.
///
/// Any of these aborts ingestion of the whole source; nothing from the
/// document is rendered.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Bad URI encoding")]
    BadUriEncoding,

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("geoJson must not be an array")]
    TopLevelArray,

    #[error("geoJson doesn't have type FeatureCollection")]
    NotFeatureCollection,

    #[error("geoJson doesn't have features or features isn't an array")]
    MissingFeatures,

    #[error("feature {index}: Invalid GeoJSON object")]
    InvalidFeature { index: usize },

    #[error("feature {index}: popupText must be a string or an array of strings")]
    InvalidPopupText { index: usize },

    #[error("feature {index}: invalid geometry: {source}")]
    InvalidGeometry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("gistId is invalid: {0}")]
    InvalidGistId(String),

    #[error("Gist error: {0}")]
    Gist(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;
