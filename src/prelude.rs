//! Prelude module for common bitcraft-map types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use bitcraft_map::prelude::*;`

pub use crate::core::{
    config::{MapOptions, SpiderfyOptions},
    geo::{GameCoord, LatLng, LatLngBounds, Point},
    map::{CameraAction, Map},
    projection::{coordinates_label, readable_coordinates, HexProjection},
    viewport::Viewport,
};

pub use crate::layers::{
    base::{Layer, LayerId, LayerKind},
    icon::{Icon, IconManifest},
    marker::Marker,
    registry::LayerRegistry,
    vector::{CircleMarker, PathStyle, Polygon, Polyline, Primitive, PrimitiveId, Tooltip},
};

pub use crate::data::{
    geojson::{Feature, FeatureCollection, Geometry},
    poi::PoiCategory,
    properties::{FeatureDisplay, FeatureProperties, PopupText},
    renderer::{FeatureRenderer, RenderReport},
    validate::{decode_uri_component, escape_html, validate},
};

pub use crate::input::events::MapEvent;

pub use crate::spatial::spiderfy::{GroupKey, SpiderHost, Spiderfy};

pub use crate::sources::{
    assets::{AssetLoader, TextFetcher},
    gist::GistClient,
    page::PageLocation,
};

pub use crate::ui::{
    controls::{LayerControls, ToggleEntry, ToggleGroup},
    popup::{Popup, PopupOptions},
};

pub use crate::{Error as MapError, FormatError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
