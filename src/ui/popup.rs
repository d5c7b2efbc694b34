use serde::{Deserialize, Serialize};

/// Behaviour flags of a popup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupOptions {
    /// Pan the view so the opened popup is fully visible
    pub auto_pan: bool,
    /// Close when another popup opens
    pub auto_close: bool,
    /// Pane the popup is drawn in, `None` for the host's default
    pub pane: Option<String>,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            auto_pan: true,
            auto_close: true,
            pane: None,
        }
    }
}

/// HTML content bound to a primitive and shown on click.
///
/// The content is handed to the host verbatim; anything that came from
/// untrusted input has already been escaped by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub content: String,
    pub options: PopupOptions,
}

impl Popup {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            options: PopupOptions::default(),
        }
    }

    pub fn with_pane(mut self, pane: impl Into<String>) -> Self {
        self.options.pane = Some(pane.into());
        self
    }

    /// Stays open and never moves the view: used for map labels.
    pub fn pinned(mut self) -> Self {
        self.options.auto_pan = false;
        self.options.auto_close = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_popup() {
        let popup = Popup::new("Camp").pinned();
        assert!(!popup.options.auto_pan);
        assert!(!popup.options.auto_close);
        assert_eq!(popup.options.pane, None);
    }

    #[test]
    fn test_pane() {
        let popup = Popup::new("x").with_pane("popupOnTop");
        assert_eq!(popup.options.pane.as_deref(), Some("popupOnTop"));
        assert!(popup.options.auto_close);
    }
}
