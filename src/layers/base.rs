use crate::layers::vector::PrimitiveId;

/// The kinds of layer the registry can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Group,
    FeatureGroup,
    GeoJson,
    Tile,
    RasterCanvas,
    VectorCanvas,
    ImageOverlay,
}

impl LayerKind {
    /// Resolves a kind name; anything unrecognized is a plain group.
    pub fn parse(name: &str) -> Self {
        match name {
            "group" => LayerKind::Group,
            "feature" | "feature-group" => LayerKind::FeatureGroup,
            "geojson" => LayerKind::GeoJson,
            "tile" => LayerKind::Tile,
            "canvas" | "raster-canvas" => LayerKind::RasterCanvas,
            "svg" | "vector-canvas" => LayerKind::VectorCanvas,
            "imageOverlay" | "image-overlay" => LayerKind::ImageOverlay,
            _ => LayerKind::Group,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Group => write!(f, "group"),
            LayerKind::FeatureGroup => write!(f, "feature-group"),
            LayerKind::GeoJson => write!(f, "geojson"),
            LayerKind::Tile => write!(f, "tile"),
            LayerKind::RasterCanvas => write!(f, "raster-canvas"),
            LayerKind::VectorCanvas => write!(f, "vector-canvas"),
            LayerKind::ImageOverlay => write!(f, "image-overlay"),
        }
    }
}

/// Identity of a layer instance, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// A named container of map primitives.
///
/// The layer only lists its members; the primitives themselves live in the
/// map context so one marker can belong to several layers.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    kind: LayerKind,
    options: serde_json::Value,
    members: Vec<PrimitiveId>,
}

impl Layer {
    pub(crate) fn new(id: LayerId, name: String, kind: LayerKind, options: serde_json::Value) -> Self {
        Self {
            id,
            name,
            kind,
            options,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn options(&self) -> &serde_json::Value {
        &self.options
    }

    /// Source URL of tile and image-overlay layers
    pub fn url(&self) -> Option<&str> {
        self.options.get("url").and_then(|url| url.as_str())
    }

    pub fn members(&self) -> &[PrimitiveId] {
        &self.members
    }

    /// Adds a primitive; returns false if it was already a member.
    pub fn add_member(&mut self, id: PrimitiveId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    pub fn remove_member(&mut self, id: PrimitiveId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != id);
        self.members.len() != before
    }
}
