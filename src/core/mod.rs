pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod projection;
pub mod viewport;

pub use config::{MapOptions, SpiderfyOptions};
pub use geo::{GameCoord, LatLng, LatLngBounds, Point};
pub use map::{CameraAction, Map};
pub use viewport::Viewport;
