pub mod controls;
pub mod popup;

pub use controls::{LayerControls, ToggleEntry, ToggleGroup};
pub use popup::{Popup, PopupOptions};
