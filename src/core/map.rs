use crate::{
    core::{
        config::{MapOptions, SpiderfyOptions},
        constants::TERRAIN_LAYER,
        geo::{LatLng, LatLngBounds, Point},
        projection::coordinates_label,
        viewport::Viewport,
    },
    data::poi,
    input::events::MapEvent,
    layers::{
        base::{Layer, LayerId, LayerKind},
        icon::IconManifest,
        registry::LayerRegistry,
        vector::{PathStyle, Polyline, Primitive, PrimitiveId},
    },
    prelude::HashMap,
    spatial::spiderfy::{SpiderHost, Spiderfy},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A camera move requested by rendered content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraAction {
    FlyTo { center: LatLng, zoom: f64 },
    FitBounds(LatLngBounds),
}

/// The map page: viewport, layers, the primitives they hold, open popups
/// and the spiderfy controller.
///
/// One `Map` is built at startup and handed to every component that
/// needs it. A primitive is on the surface while at least one visible
/// layer holds it (or it was added to the surface directly); crossing
/// that line raises [`MapEvent::LayerAdd`] / [`MapEvent::LayerRemove`].
pub struct Map {
    options: MapOptions,
    viewport: Viewport,
    registry: LayerRegistry,
    icons: IconManifest,
    primitives: BTreeMap<PrimitiveId, Primitive>,
    next_primitive: u64,
    /// Number of visible containers holding each attached primitive
    attached: HashMap<PrimitiveId, usize>,
    /// Primitives added straight to the surface, e.g. spider legs
    surface: Vec<PrimitiveId>,
    open_popups: Vec<PrimitiveId>,
    spiderfy: Option<Spiderfy>,
    coordinates: Option<String>,
    camera: Option<CameraAction>,
}

impl Map {
    pub fn new(options: MapOptions) -> Self {
        Self::with_icons(options, IconManifest::builtin())
    }

    /// Builds the page: terrain image, every named layer (hidden), the
    /// default layers shown, the whole world in view and spiderfy enabled.
    pub fn with_icons(options: MapOptions, icons: IconManifest) -> Self {
        let viewport = Viewport::new(options.center(), 0.0, options.viewport_size)
            .with_zoom_limits(options.min_zoom, options.max_zoom, options.zoom_snap);

        let mut map = Self {
            viewport,
            registry: LayerRegistry::new(),
            icons,
            primitives: BTreeMap::new(),
            next_primitive: 0,
            attached: HashMap::default(),
            surface: Vec::new(),
            open_popups: Vec::new(),
            spiderfy: None,
            coordinates: None,
            camera: None,
            options,
        };

        let image_bounds = map.options.image_bounds();
        let overlay = serde_json::json!({
            "url": map.options.image_url,
            "bounds": [
                [image_bounds.south_west.lat, image_bounds.south_west.lng],
                [image_bounds.north_east.lat, image_bounds.north_east.lng],
            ],
        });
        map.create_layer(TERRAIN_LAYER, LayerKind::ImageOverlay, overlay, true);
        for name in poi::page_layers() {
            map.create_layer(&name, LayerKind::Group, serde_json::Value::Null, false);
        }
        for name in map.options.default_layers.clone() {
            if !map.show_layer(&name) {
                log::warn!("default layer '{}' does not exist", name);
            }
        }

        let world = map.options.map_bounds();
        map.viewport.fit_bounds(&world);
        let spiderfy = map.options.spiderfy.clone();
        map.enable_spiderfy(spiderfy);

        log::info!(
            "map ready: {} layers, zoom {:.1}",
            map.registry.len(),
            map.viewport.zoom
        );
        map
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn icons(&self) -> &IconManifest {
        &self.icons
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.registry.get(name)
    }

    /// Registers a layer, or returns the existing one's id (see
    /// [`LayerRegistry::create`]).
    pub fn create_layer(
        &mut self,
        name: &str,
        kind: LayerKind,
        options: serde_json::Value,
        add_to_map: bool,
    ) -> LayerId {
        let was_visible = self.registry.is_visible(name);
        let layer = self.registry.create(name, kind, options, false);
        let id = layer.id();
        if add_to_map && !was_visible {
            self.show_layer(name);
        }
        id
    }

    /// Attaches a layer and everything in it. False for unknown names.
    pub fn show_layer(&mut self, name: &str) -> bool {
        if self.registry.is_visible(name) {
            return true;
        }
        if !self.registry.show(name) {
            return false;
        }
        for id in self.members_of(name) {
            self.attach(id);
        }
        log::debug!("layer '{}' shown", name);
        true
    }

    /// Detaches a layer; its primitives leave the surface unless another
    /// visible layer holds them too.
    pub fn hide_layer(&mut self, name: &str) -> bool {
        if !self.registry.has(name) {
            return false;
        }
        if !self.registry.is_visible(name) {
            return true;
        }
        self.registry.hide(name);
        for id in self.members_of(name) {
            self.detach(id);
        }
        log::debug!("layer '{}' hidden", name);
        true
    }

    /// Returns the new visibility; false for unknown names.
    pub fn toggle_layer(&mut self, name: &str) -> bool {
        if self.registry.is_visible(name) {
            self.hide_layer(name);
            false
        } else {
            self.show_layer(name)
        }
    }

    pub fn is_layer_visible(&self, name: &str) -> bool {
        self.registry.is_visible(name)
    }

    /// Detaches and unregisters a layer. Primitives no other layer holds
    /// are dropped with it.
    pub fn delete_layer(&mut self, name: &str) -> bool {
        self.hide_layer(name);
        let members = self.members_of(name);
        if !self.registry.delete(name) {
            return false;
        }
        for id in members {
            let still_held = self.registry.iter().any(|layer| layer.members().contains(&id))
                || self.surface.contains(&id);
            if !still_held {
                self.primitives.remove(&id);
                self.open_popups.retain(|open| *open != id);
            }
        }
        true
    }

    fn members_of(&self, name: &str) -> Vec<PrimitiveId> {
        self.registry
            .get(name)
            .map(|layer| layer.members().to_vec())
            .unwrap_or_default()
    }

    fn insert_primitive(&mut self, primitive: Primitive) -> PrimitiveId {
        self.next_primitive += 1;
        let id = PrimitiveId(self.next_primitive);
        self.primitives.insert(id, primitive);
        id
    }

    /// Stores a primitive in a registered layer. `None` when the layer
    /// does not exist; the primitive is dropped.
    pub fn add_primitive(&mut self, layer: &str, primitive: Primitive) -> Option<PrimitiveId> {
        if !self.registry.has(layer) {
            log::warn!("cannot add to unknown layer '{}'", layer);
            return None;
        }
        let id = self.insert_primitive(primitive);
        self.add_to_layer(layer, id);
        Some(id)
    }

    /// Adds an existing primitive to (another) layer.
    pub fn add_to_layer(&mut self, layer: &str, id: PrimitiveId) -> bool {
        if !self.primitives.contains_key(&id) {
            return false;
        }
        let visible = self.registry.is_visible(layer);
        let Some(target) = self.registry.get_mut(layer) else {
            return false;
        };
        if target.add_member(id) && visible {
            self.attach(id);
        }
        true
    }

    /// Draws a primitive that belongs to no layer.
    pub fn add_to_surface(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = self.insert_primitive(primitive);
        self.surface.push(id);
        self.attach(id);
        id
    }

    /// Takes a primitive off the surface and out of every layer.
    pub fn remove_primitive(&mut self, id: PrimitiveId) -> Option<Primitive> {
        if !self.primitives.contains_key(&id) {
            return None;
        }
        let holders: Vec<String> = self
            .registry
            .iter()
            .filter(|layer| layer.members().contains(&id))
            .map(|layer| layer.name().to_string())
            .collect();
        for name in holders {
            let visible = self.registry.is_visible(&name);
            if let Some(layer) = self.registry.get_mut(&name) {
                layer.remove_member(id);
            }
            if visible {
                self.detach(id);
            }
        }
        if let Some(index) = self.surface.iter().position(|s| *s == id) {
            self.surface.remove(index);
            self.detach(id);
        }
        self.primitives.remove(&id)
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Primitives of a layer, in insertion order
    pub fn layer_primitives(&self, name: &str) -> Vec<(PrimitiveId, &Primitive)> {
        self.registry
            .get(name)
            .map(|layer| {
                layer
                    .members()
                    .iter()
                    .filter_map(|id| self.primitives.get(id).map(|p| (*id, p)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_attached(&self, id: PrimitiveId) -> bool {
        self.attached.contains_key(&id)
    }

    /// Everything currently on the surface, oldest first
    pub fn visible_primitives(&self) -> Vec<(PrimitiveId, &Primitive)> {
        self.primitives
            .iter()
            .filter(|(id, _)| self.attached.contains_key(id))
            .map(|(id, primitive)| (*id, primitive))
            .collect()
    }

    fn attach(&mut self, id: PrimitiveId) {
        let count = self.attached.entry(id).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.handle_event(MapEvent::LayerAdd { primitive: id });
        }
    }

    fn detach(&mut self, id: PrimitiveId) {
        let Some(count) = self.attached.get_mut(&id) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.attached.remove(&id);
            self.handle_event(MapEvent::LayerRemove { primitive: id });
        }
    }

    /// Opens the popup bound to an attached primitive. Other popups close
    /// unless they are pinned.
    pub fn open_popup(&mut self, id: PrimitiveId) -> bool {
        let Some(primitive) = self.primitives.get(&id) else {
            return false;
        };
        if primitive.popup().is_none() || !self.is_attached(id) {
            return false;
        }
        let primitives = &self.primitives;
        self.open_popups.retain(|open| {
            *open == id
                || primitives
                    .get(open)
                    .and_then(Primitive::popup)
                    .is_some_and(|popup| !popup.options.auto_close)
        });
        if !self.open_popups.contains(&id) {
            self.open_popups.push(id);
        }
        log::debug!("popup of {} opened", id);
        true
    }

    pub fn close_popup(&mut self, id: PrimitiveId) -> bool {
        let before = self.open_popups.len();
        self.open_popups.retain(|open| *open != id);
        self.open_popups.len() != before
    }

    /// Primitives whose popup is showing, in opening order
    pub fn open_popups(&self) -> &[PrimitiveId] {
        &self.open_popups
    }

    /// The "N: .. E: .." readout for the last pointer position
    pub fn coordinates(&self) -> Option<&str> {
        self.coordinates.as_deref()
    }

    /// The last camera action applied
    pub fn camera(&self) -> Option<&CameraAction> {
        self.camera.as_ref()
    }

    pub fn fly_to(&mut self, center: LatLng, zoom: f64) {
        self.apply_camera(CameraAction::FlyTo { center, zoom });
    }

    pub fn fit_bounds(&mut self, bounds: LatLngBounds) {
        self.apply_camera(CameraAction::FitBounds(bounds));
    }

    /// Moves the view. A zoom change raises [`MapEvent::ZoomStart`] first.
    pub fn apply_camera(&mut self, action: CameraAction) {
        let (center, zoom) = match &action {
            CameraAction::FlyTo { center, zoom } => (*center, self.viewport.limit_zoom(*zoom)),
            CameraAction::FitBounds(bounds) => (bounds.center(), self.viewport.bounds_zoom(bounds)),
        };
        if (zoom - self.viewport.zoom).abs() > f64::EPSILON {
            self.handle_event(MapEvent::ZoomStart { zoom });
        }
        self.viewport.set_view(center, zoom);
        log::debug!("camera {:?}", action);
        self.camera = Some(action);
    }

    /// Turns on spiderfy, replacing an existing controller. Markers
    /// already on the surface join their groups.
    pub fn enable_spiderfy(&mut self, options: SpiderfyOptions) {
        self.disable_spiderfy();
        let mut spiderfy = Spiderfy::new(options);
        for (id, primitive) in &self.primitives {
            if self.attached.contains_key(id) {
                spiderfy.on_layer_add(*id, primitive);
            }
        }
        self.spiderfy = Some(spiderfy);
    }

    /// Collapses every spread group and drops the controller.
    pub fn disable_spiderfy(&mut self) {
        if let Some(mut spiderfy) = self.spiderfy.take() {
            spiderfy.destroy(self);
        }
    }

    pub fn spiderfy(&self) -> Option<&Spiderfy> {
        self.spiderfy.as_ref()
    }

    /// Runs `f` with the spiderfy controller taken out, so it can use the
    /// map as its host.
    fn with_spiderfy<R>(&mut self, f: impl FnOnce(&mut Spiderfy, &mut Self) -> R) -> Option<R> {
        let mut spiderfy = self.spiderfy.take()?;
        let result = f(&mut spiderfy, self);
        self.spiderfy = Some(spiderfy);
        Some(result)
    }

    /// Routes one event to the components that react to it.
    pub fn handle_event(&mut self, event: MapEvent) {
        log::trace!("event {}", event.name());
        match event {
            MapEvent::MarkerClick { marker } => {
                let handled = self
                    .with_spiderfy(|spiderfy, map| spiderfy.on_marker_click(map, marker))
                    .unwrap_or(false);
                if !handled {
                    self.open_popup(marker);
                }
            }
            MapEvent::Click { .. } => {
                self.with_spiderfy(|spiderfy, map| spiderfy.on_map_click(map));
                let primitives = &self.primitives;
                self.open_popups.retain(|open| {
                    primitives
                        .get(open)
                        .and_then(Primitive::popup)
                        .is_some_and(|popup| !popup.options.auto_close)
                });
            }
            MapEvent::MouseMove { lat_lng } => {
                self.coordinates = Some(coordinates_label(&lat_lng));
            }
            MapEvent::ZoomStart { zoom } => {
                self.with_spiderfy(|spiderfy, map| spiderfy.on_zoom_start(map));
                let center = self.viewport.center;
                self.viewport.set_view(center, zoom);
            }
            MapEvent::ViewChange { center, zoom } => {
                if (self.viewport.limit_zoom(zoom) - self.viewport.zoom).abs() > f64::EPSILON {
                    self.handle_event(MapEvent::ZoomStart { zoom });
                }
                self.viewport.set_view(center, zoom);
            }
            MapEvent::LayerAdd { primitive } => {
                let Some(added) = self.primitives.get(&primitive) else {
                    return;
                };
                // labels show as soon as they are on the surface
                if matches!(added, Primitive::Tooltip(_)) && !self.open_popups.contains(&primitive)
                {
                    self.open_popups.push(primitive);
                }
                if let Some(spiderfy) = self.spiderfy.as_mut() {
                    spiderfy.on_layer_add(primitive, added);
                }
            }
            MapEvent::LayerRemove { primitive } => {
                self.close_popup(primitive);
                self.with_spiderfy(|spiderfy, map| spiderfy.on_layer_remove(map, primitive));
            }
            MapEvent::PopupClose { primitive } => {
                self.close_popup(primitive);
            }
        }
    }
}

impl SpiderHost for Map {
    fn lat_lng_to_layer_point(&self, lat_lng: &LatLng) -> Point {
        self.viewport.lat_lng_to_layer_point(lat_lng)
    }

    fn layer_point_to_lat_lng(&self, point: &Point) -> LatLng {
        self.viewport.layer_point_to_lat_lng(point)
    }

    fn set_marker_position(&mut self, marker: PrimitiveId, position: LatLng) {
        if let Some(marker) = self
            .primitives
            .get_mut(&marker)
            .and_then(Primitive::as_marker_mut)
        {
            marker.set_position(position);
        }
    }

    fn add_leg(&mut self, from: LatLng, to: LatLng, style: &PathStyle) -> PrimitiveId {
        self.add_to_surface(Primitive::Polyline(Polyline {
            points: vec![from, to],
            style: style.clone(),
            popup: None,
        }))
    }

    fn remove_leg(&mut self, leg: PrimitiveId) {
        self.remove_primitive(leg);
    }

    fn open_popup(&mut self, marker: PrimitiveId) {
        Map::open_popup(self, marker);
    }
}
