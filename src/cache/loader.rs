use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::CacheError;

use super::metadata::{CacheMetadata, CACHE_VERSION};
use super::schema::{prune, CachedShard, ProjectsCache};

/// Reads the persisted cache back into memory
pub struct CacheLoader {
    cache_dir: PathBuf,
}

impl CacheLoader {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Load every readable shard. A missing, corrupt or incompatible cache
    /// yields an empty map; unreadable shards are skipped individually.
    pub fn load(&self) -> ProjectsCache {
        match self.try_load() {
            Ok(projects) => {
                info!("Loaded {} cache keys from {:?}", projects.len(), self.cache_dir);
                projects
            }
            Err(CacheError::NotFound) => {
                debug!("No cache at {:?}", self.cache_dir);
                ProjectsCache::new()
            }
            Err(e) => {
                warn!("Ignoring cache at {:?}: {}", self.cache_dir, e);
                ProjectsCache::new()
            }
        }
    }

    fn try_load(&self) -> Result<ProjectsCache, CacheError> {
        let metadata_path = self.cache_dir.join("metadata.json");
        if !metadata_path.exists() {
            return Err(CacheError::NotFound);
        }

        let metadata_content = fs::read_to_string(&metadata_path)?;
        let metadata: CacheMetadata = serde_json::from_str(&metadata_content)
            .map_err(|e| CacheError::Deserialize(e.to_string()))?;
        if !metadata.is_compatible() {
            warn!(
                "Cache version mismatch: {} (expected {})",
                metadata.version, CACHE_VERSION
            );
            return Err(CacheError::VersionMismatch);
        }

        let mut projects = ProjectsCache::new();
        let entries_dir = self.cache_dir.join("entries");
        if !entries_dir.is_dir() {
            return Ok(projects);
        }

        for dir_entry in fs::read_dir(&entries_dir)?.flatten() {
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("bin") {
                continue;
            }
            match Self::read_shard(&path) {
                Ok(mut shard) => {
                    prune(&mut shard.entry);
                    if !shard.entry.is_empty() {
                        projects.insert(shard.key, shard.entry);
                    }
                }
                Err(e) => warn!("Skipping cache shard {:?}: {}", path, e),
            }
        }

        Ok(projects)
    }

    pub(super) fn read_shard(path: &Path) -> Result<CachedShard, CacheError> {
        let data = fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }
}
