pub mod spiderfy;

pub use spiderfy::{GroupKey, SpiderHost, Spiderfy};
