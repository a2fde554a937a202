use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CacheError;
use crate::util::fnv1a_64;

use super::loader::CacheLoader;
use super::metadata::CacheMetadata;
use super::schema::{CacheEntry, CachedShardRef};

/// Shard files sharing one key hash
const SLOTS_PER_HASH: usize = 8;

/// Where a key lives among the slots of its hash
struct SlotLookup {
    holding: Option<PathBuf>,
    free: Option<PathBuf>,
}

/// Writes cache keys as individual shards under `<cache_dir>/entries`
pub struct CacheWriter {
    cache_dir: PathBuf,
}

impl CacheWriter {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Shard file backing `key`: the slot already holding it, else the first
    /// free slot of its hash
    pub fn shard_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        let lookup = self.lookup(key);
        lookup
            .holding
            .or(lookup.free)
            .ok_or_else(|| CacheError::SlotsExhausted(key.to_string()))
    }

    fn slot_path(&self, hash: u64, slot: usize) -> PathBuf {
        let name = match slot {
            0 => format!("{:016x}.bin", hash),
            n => format!("{:016x}-{}.bin", hash, n),
        };
        self.cache_dir.join("entries").join(name)
    }

    /// Scan every slot of the key's hash. Another key's shard is never
    /// reused; an unreadable one is.
    fn lookup(&self, key: &str) -> SlotLookup {
        let hash = fnv1a_64(key);
        let mut free = None;
        for slot in 0..SLOTS_PER_HASH {
            let path = self.slot_path(hash, slot);
            if !path.exists() {
                free.get_or_insert(path);
                continue;
            }
            match CacheLoader::read_shard(&path) {
                Ok(shard) if shard.key == key => {
                    return SlotLookup {
                        holding: Some(path),
                        free,
                    };
                }
                Ok(shard) => debug!("Shard {:?} holds {}, not {}", path, shard.key, key),
                Err(_) => {
                    free.get_or_insert(path);
                }
            }
        }
        SlotLookup {
            holding: None,
            free,
        }
    }

    fn ensure_layout(&self) -> Result<(), CacheError> {
        fs::create_dir_all(self.cache_dir.join("entries"))?;

        let metadata_path = self.cache_dir.join("metadata.json");
        let current = fs::read_to_string(&metadata_path)
            .ok()
            .and_then(|content| serde_json::from_str::<CacheMetadata>(&content).ok())
            .is_some_and(|metadata| metadata.is_compatible());
        if !current {
            let json = serde_json::to_string_pretty(&CacheMetadata::new())
                .map_err(|e| CacheError::Encode(e.to_string()))?;
            fs::write(&metadata_path, json)?;
        }
        Ok(())
    }

    /// Persist `entry` under `key`, or delete the shard when `entry` is `None`
    pub fn write_key(&self, key: &str, entry: Option<&CacheEntry>) -> Result<(), CacheError> {
        match entry {
            Some(entry) => {
                self.ensure_layout()?;
                let path = self.shard_path(key)?;
                let data = bincode::serialize(&CachedShardRef { key, entry })
                    .map_err(|e| CacheError::Encode(e.to_string()))?;
                let tmp_path = path.with_extension("tmp");
                fs::write(&tmp_path, data)?;
                fs::rename(&tmp_path, &path)?;
                debug!("Wrote cache shard {:?} for {}", path, key);
            }
            None => {
                let Some(path) = self.lookup(key).holding else {
                    return Ok(());
                };
                match fs::remove_file(&path) {
                    Ok(()) => debug!("Removed cache shard {:?} for {}", path, key),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(())
    }

    /// Delete the whole persisted cache
    pub fn remove_all(&self) -> Result<(), CacheError> {
        match fs::remove_dir_all(&self.cache_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::cache::schema::replace_slice;
    use crate::model::{CompletionEntry, SymbolKind};

    fn entry(name: &str) -> CacheEntry {
        let mut entry = CacheEntry::new();
        replace_slice(
            &mut entry,
            SymbolKind::Class,
            "/w/a.css",
            vec![CompletionEntry::new(format!("{}\ta.css", name), name)],
        );
        entry
    }

    #[test]
    fn test_shard_of_another_key_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let writer = CacheWriter::new(dir.path());

        // Plant a shard for "/w/other" where "/w/a.css" would go first
        writer.write_key("/w/other", Some(&entry("other"))).unwrap();
        let first_slot = writer.slot_path(fnv1a_64("/w/a.css"), 0);
        fs::rename(writer.shard_path("/w/other").unwrap(), &first_slot).unwrap();

        writer.write_key("/w/a.css", Some(&entry("a"))).unwrap();
        let a_slot = writer.shard_path("/w/a.css").unwrap();
        assert_ne!(a_slot, first_slot);

        let loaded = CacheLoader::new(dir.path()).load();
        assert!(loaded.contains_key("/w/other"));
        assert!(loaded.contains_key("/w/a.css"));

        writer.write_key("/w/a.css", None).unwrap();
        assert!(!a_slot.exists());
        assert!(first_slot.exists());
        let loaded = CacheLoader::new(dir.path()).load();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("/w/other"));
    }

    #[test]
    fn test_rewrite_reuses_the_same_slot() {
        let dir = TempDir::new().unwrap();
        let writer = CacheWriter::new(dir.path());
        writer.write_key("/w/a.css", Some(&entry("a"))).unwrap();
        let path = writer.shard_path("/w/a.css").unwrap();
        writer.write_key("/w/a.css", Some(&entry("b"))).unwrap();
        assert_eq!(writer.shard_path("/w/a.css").unwrap(), path);
        assert_eq!(fs::read_dir(dir.path().join("entries")).unwrap().count(), 1);
    }

    #[test]
    fn test_removing_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(CacheWriter::new(dir.path()).write_key("/w/none", None).is_ok());
    }
}
