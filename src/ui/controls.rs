use crate::{
    core::{
        constants::{
            BANKS_LAYER, CAVE_TIERS, CLAIM_TIERS, GRIDS_LAYER, MARKETS_LAYER, RUINED_LAYER,
            TEMPLES_LAYER, TREES_LAYER, WAYPOINTS_LAYER, WAYSTONES_LAYER,
        },
        map::Map,
    },
    data::poi::{cave_layer, claim_layer},
};

/// One checkbox: a label and the layers it switches together
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleEntry {
    pub label: String,
    pub layers: Vec<String>,
}

impl ToggleEntry {
    pub fn new(label: impl Into<String>, layers: Vec<String>) -> Self {
        Self {
            label: label.into(),
            layers,
        }
    }

    fn single(label: &str, layer: &str) -> Self {
        Self::new(label, vec![layer.to_string()])
    }
}

/// A panel of checkboxes
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleGroup {
    pub name: String,
    pub entries: Vec<ToggleEntry>,
}

/// The layer toggle panels of the map page.
///
/// Controls hold no visibility state of their own: an entry is checked
/// when all of its layers are visible on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerControls {
    groups: Vec<ToggleGroup>,
}

impl Default for LayerControls {
    fn default() -> Self {
        let generic = [
            ("Wonders", TREES_LAYER),
            ("Temples", TEMPLES_LAYER),
            ("Ruined Cities", RUINED_LAYER),
            ("Banks", BANKS_LAYER),
            ("Markets", MARKETS_LAYER),
            ("Waystones", WAYSTONES_LAYER),
            ("Grids", GRIDS_LAYER),
            ("Waypoints", WAYPOINTS_LAYER),
        ]
        .iter()
        .map(|(label, layer)| ToggleEntry::single(label, layer))
        .collect();

        let claim_tiers = CLAIM_TIERS
            .filter(|tier| *tier > 0)
            .map(|tier| ToggleEntry::single(&format!("Claims T{}", tier), &claim_layer(tier)))
            .collect();
        let cave_tiers = CAVE_TIERS
            .map(|tier| ToggleEntry::single(&format!("Caves T{}", tier), &cave_layer(tier)))
            .collect();

        Self::new(vec![
            ToggleGroup {
                name: "generic".to_string(),
                entries: generic,
            },
            ToggleGroup {
                name: "claims".to_string(),
                entries: vec![ToggleEntry::new(
                    "Claims",
                    CLAIM_TIERS.map(claim_layer).collect(),
                )],
            },
            ToggleGroup {
                name: "claimTiers".to_string(),
                entries: claim_tiers,
            },
            ToggleGroup {
                name: "caves".to_string(),
                entries: vec![ToggleEntry::new("Caves", CAVE_TIERS.map(cave_layer).collect())],
            },
            ToggleGroup {
                name: "caveTiers".to_string(),
                entries: cave_tiers,
            },
        ])
    }
}

impl LayerControls {
    pub fn new(groups: Vec<ToggleGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[ToggleGroup] {
        &self.groups
    }

    pub fn entry(&self, label: &str) -> Option<&ToggleEntry> {
        self.groups
            .iter()
            .flat_map(|group| group.entries.iter())
            .find(|entry| entry.label == label)
    }

    pub fn is_checked(&self, map: &Map, label: &str) -> bool {
        self.entry(label).is_some_and(|entry| {
            !entry.layers.is_empty() && entry.layers.iter().all(|layer| map.is_layer_visible(layer))
        })
    }

    /// Shows or hides every layer of an entry. False for unknown labels.
    pub fn set_checked(&self, map: &mut Map, label: &str, checked: bool) -> bool {
        let Some(entry) = self.entry(label) else {
            log::debug!("no toggle labelled '{}'", label);
            return false;
        };
        for layer in &entry.layers {
            if checked {
                map.show_layer(layer);
            } else {
                map.hide_layer(layer);
            }
        }
        log::debug!("toggle '{}' set to {}", label, checked);
        true
    }

    /// Flips an entry; returns whether it is now checked.
    pub fn toggle(&self, map: &mut Map, label: &str) -> bool {
        let checked = !self.is_checked(map, label);
        self.set_checked(map, label, checked) && checked
    }

    /// Every entry label with its checkbox state, panel by panel
    pub fn states<'a>(&'a self, map: &Map) -> Vec<(&'a str, bool)> {
        self.groups
            .iter()
            .flat_map(|group| group.entries.iter())
            .map(|entry| (entry.label.as_str(), self.is_checked(map, &entry.label)))
            .collect()
    }
}
