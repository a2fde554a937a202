use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::{InitializeParams, Url};

use crate::config::{GlobExpander, Settings};
use crate::error::ConfigError;
use crate::host::{Document, WindowState};
use crate::model::Dialect;
use crate::util::uri_to_path_string;

const CACHE_DIR: &str = ".css-extended-lsp/cache";

/// Workspace root, open folders and project descriptor
#[derive(Debug, Clone, Default)]
pub struct WorkspaceState {
    pub root: Option<PathBuf>,
    pub folders: Vec<String>,
    pub project_file: Option<String>,
}

impl WorkspaceState {
    pub fn from_params(params: &InitializeParams) -> Self {
        let mut folders: Vec<String> = params
            .workspace_folders
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|folder| uri_to_path_string(&folder.uri))
            .collect();

        #[allow(deprecated)]
        let root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok())
            .or_else(|| folders.first().map(PathBuf::from));

        if folders.is_empty() {
            if let Some(root) = &root {
                folders.push(root.to_string_lossy().to_string());
            }
        }

        Self {
            root,
            folders,
            project_file: None,
        }
    }

    /// Snapshot of the folders and every open document
    pub fn window(&self, documents: &DashMap<Url, Arc<Document>>) -> WindowState {
        let mut open: Vec<(String, Arc<Document>)> = documents
            .iter()
            .map(|entry| (entry.key().to_string(), Arc::clone(entry.value())))
            .collect();
        open.sort_by(|a, b| a.0.cmp(&b.0));

        WindowState::new(
            self.project_file.clone(),
            self.folders.clone(),
            open.into_iter().map(|(_, doc)| doc).collect(),
        )
    }

    /// `settings.cache_dir`, else `<root>/.css-extended-lsp/cache`
    pub fn cache_dir(&self, settings: &Settings) -> Option<PathBuf> {
        match &settings.cache_dir {
            Some(dir) => Some(self.resolve(dir)),
            None => self.root.as_ref().map(|root| root.join(CACHE_DIR)),
        }
    }

    /// Expand `load_external_files`, resolving relative patterns against the root
    pub fn external_files(&self, settings: &Settings) -> Result<Vec<PathBuf>, ConfigError> {
        let patterns: Vec<String> = settings
            .load_external_files
            .iter()
            .map(|pattern| self.resolve(pattern).to_string_lossy().to_string())
            .collect();
        Ok(GlobExpander::new(&patterns)?.expand())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        match &self.root {
            Some(root) if candidate.is_relative() => root.join(candidate),
            _ => candidate.to_path_buf(),
        }
    }
}

/// Build a tagged document for `uri`; non-file URIs keep the URI as name
pub fn document_from_uri(uri: &Url, text: &str, markup_extensions: &[String]) -> Document {
    match uri.to_file_path() {
        Ok(path) => {
            let dialect = Dialect::detect(&path, markup_extensions);
            Document::from_path_as(&path, text, dialect)
        }
        Err(_) => {
            let dialect = Dialect::detect(Path::new(uri.path()), markup_extensions);
            Document::new(None, uri.to_string(), dialect, text)
        }
    }
}
