pub mod assets;
pub mod gist;
pub mod page;

pub use assets::{AssetLoader, TextFetcher};
pub use gist::GistClient;
pub use page::PageLocation;
