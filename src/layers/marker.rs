use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::icon::Icon,
    ui::popup::Popup,
};

/// An icon marker. The only primitive the spiderfy plugin moves around.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    position: LatLng,
    icon: Icon,
    title: Option<String>,
    pane: Option<String>,
    popup: Option<Popup>,
}

impl Marker {
    pub fn new(position: LatLng, icon: Icon) -> Self {
        Self {
            position,
            icon,
            title: None,
            pane: None,
            popup: None,
        }
    }

    /// Hover text; also what the search control indexes
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_pane(mut self, pane: impl Into<String>) -> Self {
        self.pane = Some(pane.into());
        self
    }

    pub fn with_popup(mut self, popup: Popup) -> Self {
        self.popup = Some(popup);
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn pane(&self) -> Option<&str> {
        self.pane.as_deref()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn bind_popup(&mut self, popup: Popup) {
        self.popup = Some(popup);
    }

    pub fn bounds(&self) -> LatLngBounds {
        LatLngBounds::new(self.position, self.position)
    }
}
