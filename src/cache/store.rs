use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::extractor::SymbolExtractor;
use crate::host::{View, Window};
use crate::model::{CompletionEntry, SymbolKind};

use super::keys::{keys_of_view, CacheKeys};
use super::loader::CacheLoader;
use super::schema::{replace_slice, CacheEntry, ProjectsCache};
use super::writer::CacheWriter;

/// In-memory symbol cache, optionally backed by a directory on disk
#[derive(Debug, Default)]
pub struct CacheStore {
    projects: ProjectsCache,
    cache_dir: Option<PathBuf>,
}

impl CacheStore {
    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the cache rooted at `root`, loading whatever is readable
    pub fn open(root: &Path) -> Self {
        let cache_dir = root.join("v1");
        let projects = CacheLoader::new(&cache_dir).load();
        Self {
            projects,
            cache_dir: Some(cache_dir),
        }
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    pub fn projects(&self) -> &ProjectsCache {
        &self.projects
    }

    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.projects.get(key)
    }

    /// Entries of `kind` that `file` contributed under `key`
    pub fn file_slice(&self, key: &str, kind: SymbolKind, file: &str) -> Option<&[CompletionEntry]> {
        self.projects
            .get(key)?
            .get(&kind)?
            .get(file)
            .map(Vec::as_slice)
    }

    /// Entries of `kind` from every file stored under `key`
    pub fn kind_entries(&self, key: &str, kind: SymbolKind) -> Vec<&CompletionEntry> {
        self.projects
            .get(key)
            .and_then(|entry| entry.get(&kind))
            .map(|files| files.values().flatten().collect())
            .unwrap_or_default()
    }

    /// Re-extract `view` and replace its slices under every applicable key.
    /// Only the affected keys are written back to disk.
    pub fn save_cache(
        &mut self,
        view: &dyn View,
        window: &dyn Window,
        extractor: &SymbolExtractor,
        css_extensions: &[String],
    ) -> CacheKeys {
        let keys = keys_of_view(view, window, css_extensions, false);
        let file_path = view.key_name().to_string();
        let extracted = extractor.extract_all(view);

        let mut touched = vec![keys.file_key.clone()];
        if let Some(project_key) = &keys.project_key {
            if *project_key != keys.file_key {
                touched.push(project_key.clone());
            }
        }

        for key in &touched {
            let entry = self.projects.entry(key.clone()).or_default();
            for (kind, entries) in &extracted {
                replace_slice(entry, *kind, &file_path, entries.clone());
            }
            if entry.is_empty() {
                self.projects.remove(key);
            }
        }

        for key in &touched {
            self.persist(key);
        }

        let total: usize = extracted.iter().map(|(_, entries)| entries.len()).sum();
        info!("Cached {} symbols from {} under {:?}", total, file_path, touched);
        keys
    }

    /// Delete the persisted cache and forget everything in memory
    pub fn remove_cache(&mut self) {
        if let Some(dir) = &self.cache_dir {
            if let Err(e) = CacheWriter::new(dir).remove_all() {
                warn!("Failed to remove cache {:?}: {}", dir, e);
            }
        }
        self.projects.clear();
        info!("Cache cleared");
    }

    fn persist(&self, key: &str) {
        let Some(dir) = &self.cache_dir else {
            return;
        };
        if let Err(e) = CacheWriter::new(dir).write_key(key, self.projects.get(key)) {
            warn!("Failed to persist cache key {}: {}", key, e);
        }
    }
}
