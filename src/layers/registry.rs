use crate::{
    layers::base::{Layer, LayerId, LayerKind},
    prelude::{HashMap, HashSet},
};

/// Name-keyed store of every layer the page knows about.
///
/// Registry membership (the layer exists) and visibility (the layer is
/// attached to the map surface) are tracked separately. Unknown names are
/// never an error: lookups return `None` and operations return `false`.
pub struct LayerRegistry {
    /// All layers indexed by name
    layers: HashMap<String, Layer>,
    /// Layer names in creation order
    order: Vec<String>,
    /// Names of the layers attached to the surface
    visible: HashSet<String>,
    next_id: u64,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            order: Vec::new(),
            visible: HashSet::default(),
            next_id: 0,
        }
    }

    /// Creates a layer, or returns the existing one with that name.
    ///
    /// An existing layer keeps its original kind and options. With
    /// `add_to_map` the layer is attached either way.
    pub fn create(
        &mut self,
        name: &str,
        kind: LayerKind,
        options: serde_json::Value,
        add_to_map: bool,
    ) -> &mut Layer {
        if add_to_map {
            self.visible.insert(name.to_string());
        }
        let next_id = &mut self.next_id;
        let order = &mut self.order;
        self.layers.entry(name.to_string()).or_insert_with(|| {
            *next_id += 1;
            order.push(name.to_string());
            log::debug!("created {} layer '{}'", kind, name);
            Layer::new(LayerId(*next_id), name.to_string(), kind, options)
        })
    }

    pub fn has(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.get_mut(name)
    }

    /// Detaches and unregisters a layer; false if the name is unknown.
    pub fn delete(&mut self, name: &str) -> bool {
        if self.layers.remove(name).is_none() {
            return false;
        }
        self.visible.remove(name);
        self.order.retain(|n| n != name);
        log::debug!("deleted layer '{}'", name);
        true
    }

    /// Attaches a layer. True when the layer is now visible.
    pub fn show(&mut self, name: &str) -> bool {
        if !self.layers.contains_key(name) {
            return false;
        }
        self.visible.insert(name.to_string());
        true
    }

    /// Detaches a layer. True when the layer is now hidden.
    pub fn hide(&mut self, name: &str) -> bool {
        if !self.layers.contains_key(name) {
            return false;
        }
        self.visible.remove(name);
        true
    }

    /// Flips visibility; returns the new visibility (false if unknown).
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.is_visible(name) {
            self.hide(name);
            false
        } else {
            self.show(name)
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.visible.contains(name)
    }

    /// All layer names, in creation order
    pub fn list_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn list_by_kind(&self, kind: LayerKind) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.layers.get(*name).is_some_and(|l| l.kind() == kind))
            .map(String::as_str)
            .collect()
    }

    /// Names of the attached layers, in creation order
    pub fn visible_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.visible.contains(*name))
            .map(String::as_str)
            .collect()
    }

    /// All layers, in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.order.iter().filter_map(|name| self.layers.get(name))
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_create_is_idempotent() {
        let mut registry = LayerRegistry::new();
        let first = registry.create("x", LayerKind::Group, Value::Null, true).id();
        let second = registry
            .create("x", LayerKind::Tile, json!({ "url": "ignored" }), true)
            .id();

        assert_eq!(first, second);
        let layer = registry.get("x").unwrap();
        assert_eq!(layer.kind(), LayerKind::Group);
        assert_eq!(layer.options(), &Value::Null);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_existing_reattaches() {
        let mut registry = LayerRegistry::new();
        registry.create("x", LayerKind::Group, Value::Null, false);
        assert!(!registry.is_visible("x"));
        registry.create("x", LayerKind::Group, Value::Null, true);
        assert!(registry.is_visible("x"));
    }

    #[test]
    fn test_delete_then_get() {
        let mut registry = LayerRegistry::new();
        registry.create("x", LayerKind::Group, Value::Null, true);
        assert!(registry.delete("x"));
        assert!(registry.get("x").is_none());
        assert!(!registry.has("x"));
        assert!(!registry.is_visible("x"));
        assert!(!registry.delete("x"));
    }

    #[test]
    fn test_unknown_names_return_false() {
        let mut registry = LayerRegistry::new();
        assert!(!registry.show("nope"));
        assert!(!registry.hide("nope"));
        assert!(!registry.toggle("nope"));
        assert!(!registry.is_visible("nope"));
        assert!(!registry.has("nope"));
    }

    #[test]
    fn test_show_hide_are_idempotent() {
        let mut registry = LayerRegistry::new();
        registry.create("x", LayerKind::Group, Value::Null, false);

        assert!(registry.show("x"));
        assert!(registry.show("x"));
        assert!(registry.is_visible("x"));
        assert!(registry.hide("x"));
        assert!(registry.hide("x"));
        assert!(!registry.is_visible("x"));
        // still registered
        assert!(registry.has("x"));
    }

    #[test]
    fn test_toggle() {
        let mut registry = LayerRegistry::new();
        registry.create("x", LayerKind::Group, Value::Null, false);
        assert!(registry.toggle("x"));
        assert!(registry.is_visible("x"));
        assert!(!registry.toggle("x"));
        assert!(!registry.is_visible("x"));
    }

    #[test]
    fn test_listing() {
        let mut registry = LayerRegistry::new();
        registry.create("b", LayerKind::Group, Value::Null, true);
        registry.create("a", LayerKind::GeoJson, Value::Null, false);
        registry.create("c", LayerKind::Group, Value::Null, false);

        assert_eq!(registry.list_names(), vec!["b", "a", "c"]);
        assert_eq!(registry.list_by_kind(LayerKind::Group), vec!["b", "c"]);
        assert_eq!(registry.list_by_kind(LayerKind::GeoJson), vec!["a"]);
        assert!(registry.list_by_kind(LayerKind::Tile).is_empty());
        assert_eq!(registry.visible_names(), vec!["b"]);
    }
}
