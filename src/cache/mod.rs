pub mod keys;
pub mod loader;
pub mod metadata;
pub mod schema;
pub mod store;
pub mod writer;

pub use crate::error::CacheError;
pub use keys::{keys_of_view, project_identifier, CacheKeys};
pub use loader::CacheLoader;
pub use schema::{CacheEntry, ProjectsCache};
pub use store::CacheStore;
pub use writer::CacheWriter;
