//! Marker icons and the icon manifest.
//!
//! The manifest maps icon names (image file stems) to image paths. It is
//! generated from the image directory as a JS object literal; both that
//! form and plain JSON are accepted.

use crate::{
    core::constants::{DEFAULT_ICON, DEFAULT_ICON_SIZE},
    prelude::HashMap,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// An image marker icon, anchored at its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub name: String,
    pub url: String,
    pub size: [f64; 2],
    /// Pixel of the image placed on the marker position
    pub anchor: [f64; 2],
    /// Offset of an opened popup's tip from the anchor
    pub popup_anchor: [f64; 2],
}

impl Icon {
    pub fn new(name: impl Into<String>, url: impl Into<String>, size: [f64; 2]) -> Self {
        let [w, h] = size;
        Self {
            name: name.into(),
            url: url.into(),
            size,
            anchor: [w / 2.0, h / 2.0],
            popup_anchor: [0.0, -h / 2.0],
        }
    }
}

/// Name to image path lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconManifest {
    entries: HashMap<String, String>,
}

impl IconManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// The icons the map page itself relies on.
    pub fn builtin() -> Self {
        let mut manifest = Self::new();
        for name in ["Hex_Logo", DEFAULT_ICON, "travelerTree", "temple", "ruinedCity"] {
            manifest.insert(name, format!("assets/images/{}.png", name));
        }
        for tier in 1..=10 {
            let name = format!("t{}", tier);
            manifest.insert(&name, format!("assets/images/caves/{}.png", name));
        }
        for tier in 0..=10 {
            let name = format!("claimT{}", tier);
            manifest.insert(&name, format!("assets/images/claims/{}.png", name));
        }
        manifest
    }

    /// Parses a manifest from a JSON object, or from the generated
    /// `const iconsManifest = {...};` script.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        let json = match trimmed.find('{') {
            Some(start) if !trimmed.starts_with('{') => trimmed[start..].trim_end_matches(';'),
            Some(_) => trimmed,
            None => {
                return Err(MapError::Config(
                    "icon manifest has no object literal".to_string(),
                ))
            }
        };
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, name: &str, path: impl Into<String>) {
        self.entries.insert(name.to_string(), path.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn path(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds an icon; unknown names get the default icon's image.
    pub fn icon(&self, name: &str, size: Option<[f64; 2]>) -> Icon {
        let size = size.unwrap_or(DEFAULT_ICON_SIZE);
        match self.path(name) {
            Some(url) => Icon::new(name, url, size),
            None => Icon::new(
                DEFAULT_ICON,
                self.path(DEFAULT_ICON).unwrap_or_default(),
                size,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_anchors_at_center() {
        let icon = Icon::new("temple", "assets/images/temple.png", [40.0, 20.0]);
        assert_eq!(icon.anchor, [20.0, 10.0]);
        assert_eq!(icon.popup_anchor, [0.0, -10.0]);
    }

    #[test]
    fn test_builtin_manifest() {
        let manifest = IconManifest::builtin();
        assert!(manifest.contains("waypoint"));
        assert!(manifest.contains("t10"));
        assert!(manifest.contains("claimT0"));
        assert!(!manifest.contains("t0"));
    }

    #[test]
    fn test_unknown_icon_uses_default_image() {
        let manifest = IconManifest::builtin();
        let icon = manifest.icon("doesNotExist", None);
        assert_eq!(icon.name, "waypoint");
        assert_eq!(icon.url, "assets/images/waypoint.png");
        assert_eq!(icon.size, [32.0, 32.0]);
    }

    #[test]
    fn test_parse_generated_script() {
        let script = "const iconsManifest = {\n  \"temple\": \"assets/images/temple.png\"\n};";
        let manifest = IconManifest::from_json_str(script).unwrap();
        assert_eq!(manifest.path("temple"), Some("assets/images/temple.png"));

        let json = r#"{"waypoint": "assets/images/waypoint.svg"}"#;
        let manifest = IconManifest::from_json_str(json).unwrap();
        assert_eq!(manifest.len(), 1);

        assert!(IconManifest::from_json_str("nothing here").is_err());
    }
}
