use crate::cache::{CacheKeys, CacheStore};
use crate::config::Settings;
use crate::extractor::SymbolExtractor;
use crate::host::{View, Window};
use crate::router::CompiledScopes;

/// Everything the completion path needs, built once at startup and passed
/// by reference.
#[derive(Debug)]
pub struct AppContext {
    pub settings: Settings,
    pub scopes: CompiledScopes,
    pub store: CacheStore,
    pub extractor: SymbolExtractor,
    /// Expanded `load_external_files`, consulted first on every lookup
    pub external_files: Vec<String>,
}

impl AppContext {
    pub fn new(settings: Settings, store: CacheStore) -> Self {
        Self {
            scopes: CompiledScopes::from_settings(&settings),
            settings,
            store,
            extractor: SymbolExtractor::new(),
            external_files: Vec::new(),
        }
    }

    /// Context whose cache lives only in memory
    pub fn in_memory(settings: Settings) -> Self {
        Self::new(settings, CacheStore::in_memory())
    }

    pub fn with_external_files(mut self, files: Vec<String>) -> Self {
        self.external_files = files;
        self
    }

    /// Swap in new settings and recompile their selectors
    pub fn apply_settings(&mut self, settings: Settings) {
        self.scopes = CompiledScopes::from_settings(&settings);
        self.settings = settings;
    }

    pub fn save_cache(&mut self, view: &dyn View, window: &dyn Window) -> CacheKeys {
        self.store
            .save_cache(view, window, &self.extractor, &self.settings.css_extension)
    }

    pub fn remove_cache(&mut self) {
        self.store.remove_cache();
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::in_memory(Settings::default())
    }
}
