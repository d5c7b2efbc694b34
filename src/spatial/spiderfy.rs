//! Spiderfy declustering.
//!
//! Markers sharing a position (after rounding) form a group. Clicking a
//! member of a large enough group spreads the members on a circle around
//! the shared point, with a leg line from the center to each of them.
//! The controller owns no map state: everything it does to the surface
//! goes through a [`SpiderHost`].

use crate::{
    core::{
        config::SpiderfyOptions,
        geo::{LatLng, Point},
    },
    layers::vector::{PathStyle, Primitive, PrimitiveId},
    prelude::HashMap,
};
use std::f64::consts::PI;

/// What the spiderfy controller needs from the map surface.
pub trait SpiderHost {
    fn lat_lng_to_layer_point(&self, lat_lng: &LatLng) -> Point;
    fn layer_point_to_lat_lng(&self, point: &Point) -> LatLng;
    fn set_marker_position(&mut self, marker: PrimitiveId, position: LatLng);
    /// Draws a leg line and returns its handle
    fn add_leg(&mut self, from: LatLng, to: LatLng, style: &PathStyle) -> PrimitiveId;
    fn remove_leg(&mut self, leg: PrimitiveId);
    fn open_popup(&mut self, marker: PrimitiveId);
}

/// Position rounded to a fixed number of decimal digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub lat: i64,
    pub lng: i64,
}

impl GroupKey {
    pub fn new(lat_lng: &LatLng, precision: u32) -> Self {
        let factor = 10f64.powi(precision as i32);
        Self {
            lat: (lat_lng.lat * factor).round() as i64,
            lng: (lat_lng.lng * factor).round() as i64,
        }
    }
}

#[derive(Debug, Clone)]
struct Spider {
    legs: Vec<PrimitiveId>,
    positions: HashMap<PrimitiveId, LatLng>,
}

#[derive(Debug, Clone)]
struct SpiderGroup {
    center: LatLng,
    /// Registration order
    members: Vec<PrimitiveId>,
    /// Present only while spread
    spider: Option<Spider>,
}

impl SpiderGroup {
    fn new(center: LatLng) -> Self {
        Self {
            center,
            members: Vec::new(),
            spider: None,
        }
    }
}

/// Per-group Collapsed/Spread state machine
#[derive(Debug, Clone)]
pub struct Spiderfy {
    options: SpiderfyOptions,
    groups: HashMap<GroupKey, SpiderGroup>,
    /// Position of each tracked marker when it was first observed
    originals: HashMap<PrimitiveId, LatLng>,
}

impl Spiderfy {
    pub fn new(options: SpiderfyOptions) -> Self {
        Self {
            options,
            groups: HashMap::default(),
            originals: HashMap::default(),
        }
    }

    pub fn options(&self) -> &SpiderfyOptions {
        &self.options
    }

    fn key(&self, lat_lng: &LatLng) -> GroupKey {
        GroupKey::new(lat_lng, self.options.precision)
    }

    /// Registers a marker that was just attached to the surface. Anything
    /// that is not an icon marker is ignored.
    pub fn on_layer_add(&mut self, id: PrimitiveId, primitive: &Primitive) {
        let Some(marker) = primitive.as_marker() else {
            return;
        };
        let original = *self.originals.entry(id).or_insert(marker.position());
        let key = self.key(&original);
        let group = self
            .groups
            .entry(key)
            .or_insert_with(|| SpiderGroup::new(original));
        if !group.members.contains(&id) {
            group.members.push(id);
            log::debug!("marker {} joined spider group {:?}", id, key);
        }
    }

    /// A tracked marker left the surface. A spread group collapses first,
    /// so every member (the leaving one included) is back at its original
    /// position; an emptied group is dropped.
    pub fn on_layer_remove<H: SpiderHost + ?Sized>(&mut self, host: &mut H, id: PrimitiveId) {
        let Some(original) = self.originals.get(&id).copied() else {
            return;
        };
        let key = self.key(&original);
        if let Some(group) = self.groups.get_mut(&key) {
            Self::collapse(host, group, &self.originals);
            group.members.retain(|member| *member != id);
            if group.members.is_empty() {
                self.groups.remove(&key);
                log::debug!("spider group {:?} is empty, dropped", key);
            }
        }
        self.originals.remove(&id);
    }

    /// Handles a click on a marker. Returns false when the marker is not
    /// tracked, leaving the click to the caller.
    pub fn on_marker_click<H: SpiderHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: PrimitiveId,
    ) -> bool {
        let Some(original) = self.originals.get(&id).copied() else {
            return false;
        };
        let key = self.key(&original);
        let Some(group) = self.groups.get_mut(&key) else {
            return false;
        };

        if group.members.len() < self.options.min_circle {
            host.open_popup(id);
        } else if group.spider.is_none() {
            Self::spread(host, group, &self.options);
        } else if self.options.keep_spiderfied {
            host.open_popup(id);
        } else {
            Self::collapse(host, group, &self.originals);
        }
        true
    }

    /// The viewport starts changing zoom: every group collapses.
    pub fn on_zoom_start<H: SpiderHost + ?Sized>(&mut self, host: &mut H) {
        self.collapse_all(host);
    }

    /// A click on the map background
    pub fn on_map_click<H: SpiderHost + ?Sized>(&mut self, host: &mut H) {
        if !self.options.keep_spiderfied {
            self.collapse_all(host);
        }
    }

    /// Spreads the group `id` belongs to, if it is large enough.
    pub fn spiderfy<H: SpiderHost + ?Sized>(&mut self, host: &mut H, id: PrimitiveId) -> bool {
        let Some(key) = self.group_of(id) else {
            return false;
        };
        match self.groups.get_mut(&key) {
            Some(group) => Self::spread(host, group, &self.options),
            None => false,
        }
    }

    /// Collapses the group `id` belongs to.
    pub fn unspiderfy<H: SpiderHost + ?Sized>(&mut self, host: &mut H, id: PrimitiveId) -> bool {
        let Some(key) = self.group_of(id) else {
            return false;
        };
        match self.groups.get_mut(&key) {
            Some(group) => Self::collapse(host, group, &self.originals),
            None => false,
        }
    }

    pub fn collapse_all<H: SpiderHost + ?Sized>(&mut self, host: &mut H) {
        for group in self.groups.values_mut() {
            Self::collapse(host, group, &self.originals);
        }
    }

    /// Collapses everything and forgets all groups.
    pub fn destroy<H: SpiderHost + ?Sized>(&mut self, host: &mut H) {
        self.collapse_all(host);
        self.groups.clear();
        self.originals.clear();
    }

    fn spread<H: SpiderHost + ?Sized>(
        host: &mut H,
        group: &mut SpiderGroup,
        options: &SpiderfyOptions,
    ) -> bool {
        let n = group.members.len();
        if group.spider.is_some() || n < options.min_circle {
            return false;
        }

        let center = host.lat_lng_to_layer_point(&group.center);
        let radius = spread_radius(options, n);
        let style = options.leg_style();

        let mut spider = Spider {
            legs: Vec::with_capacity(n),
            positions: HashMap::default(),
        };
        for (i, &member) in group.members.iter().enumerate() {
            let angle = 2.0 * PI * i as f64 / n as f64;
            let point = Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            );
            let position = host.layer_point_to_lat_lng(&point);
            spider.positions.insert(member, position);
            spider.legs.push(host.add_leg(group.center, position, &style));
            host.set_marker_position(member, position);
        }
        group.spider = Some(spider);
        log::debug!("spread {} markers, radius {:.1}px", n, radius);

        if let Some(&first) = group.members.first() {
            host.open_popup(first);
        }
        true
    }

    fn collapse<H: SpiderHost + ?Sized>(
        host: &mut H,
        group: &mut SpiderGroup,
        originals: &HashMap<PrimitiveId, LatLng>,
    ) -> bool {
        let Some(spider) = group.spider.take() else {
            return false;
        };
        for member in &group.members {
            let original = originals.get(member).copied().unwrap_or(group.center);
            host.set_marker_position(*member, original);
        }
        for leg in spider.legs {
            host.remove_leg(leg);
        }
        true
    }

    /// Key of the group a tracked marker belongs to
    pub fn group_of(&self, id: PrimitiveId) -> Option<GroupKey> {
        self.originals.get(&id).map(|original| self.key(original))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Members of a group in registration order
    pub fn members(&self, key: &GroupKey) -> Option<&[PrimitiveId]> {
        self.groups.get(key).map(|group| group.members.as_slice())
    }

    pub fn is_spread(&self, key: &GroupKey) -> bool {
        self.groups
            .get(key)
            .is_some_and(|group| group.spider.is_some())
    }

    pub fn legs(&self, key: &GroupKey) -> &[PrimitiveId] {
        self.groups
            .get(key)
            .and_then(|group| group.spider.as_ref())
            .map(|spider| spider.legs.as_slice())
            .unwrap_or(&[])
    }

    /// Where a marker was placed by the current spread, if any
    pub fn spread_position(&self, id: PrimitiveId) -> Option<LatLng> {
        let key = self.group_of(id)?;
        self.groups
            .get(&key)?
            .spider
            .as_ref()?
            .positions
            .get(&id)
            .copied()
    }

    pub fn original_position(&self, id: PrimitiveId) -> Option<LatLng> {
        self.originals.get(&id).copied()
    }
}

/// Circle radius that keeps neighbours `foot_separation` apart
pub fn spread_radius(options: &SpiderfyOptions, members: usize) -> f64 {
    options
        .leg_length
        .max(options.foot_separation * members as f64 / (2.0 * PI))
}
