pub mod enrich;
pub mod jikan;
pub mod loader;

pub use enrich::enrich;
pub use jikan::{JikanClient, MetadataLookup};
