pub mod geojson;
pub mod poi;
pub mod properties;
pub mod renderer;
pub mod validate;

pub use geojson::{Feature, FeatureCollection, Geometry};
pub use poi::PoiCategory;
pub use renderer::{FeatureRenderer, RenderReport};
pub use validate::validate;
