use serde::{Deserialize, Serialize};

/// Cache format version
/// v1: one bincode shard per cache key
pub const CACHE_VERSION: u32 = 1;

/// Cache metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub version: u32,
    pub tool_version: String,
}

impl CacheMetadata {
    pub fn new() -> Self {
        Self {
            version: CACHE_VERSION,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.version == CACHE_VERSION && self.tool_version == env!("CARGO_PKG_VERSION")
    }
}

impl Default for CacheMetadata {
    fn default() -> Self {
        Self::new()
    }
}
