pub mod base;
pub mod icon;
pub mod marker;
pub mod registry;
pub mod vector;

pub use base::{Layer, LayerId, LayerKind};
pub use icon::{Icon, IconManifest};
pub use marker::Marker;
pub use registry::LayerRegistry;
pub use vector::{PathStyle, Primitive, PrimitiveId};
