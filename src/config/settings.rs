use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE_NAME: &str = "css-extended.json";

/// Contents of `css-extended.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pseudo classes and elements offered after `:`
    pub pseudo_selector_list: Vec<String>,
    /// Extensions (with the dot) treated as stylesheets
    pub css_extension: Vec<String>,
    /// Extra extensions (with the dot) tagged as HTML markup
    pub markup_extension: Vec<String>,
    /// Glob patterns of files ingested at startup
    pub load_external_files: Vec<String>,
    pub use_emmet: bool,
    pub emmet_scope: String,
    pub html_attribute_scope: String,
    pub css_completion_scope: String,
    /// Explicit project descriptor path used as the project cache key
    pub project_file: Option<String>,
    /// Overrides `<workspace>/.css-extended-lsp/cache`
    pub cache_dir: Option<String>,
    /// Spacing between two ingested files
    pub ingest_interval_ms: u64,
}

fn default_pseudo_selectors() -> Vec<String> {
    [
        "active",
        "after",
        "before",
        "checked",
        "default",
        "disabled",
        "empty",
        "enabled",
        "first-child",
        "first-letter",
        "first-line",
        "first-of-type",
        "focus",
        "focus-visible",
        "focus-within",
        "hover",
        "in-range",
        "invalid",
        "lang()",
        "last-child",
        "last-of-type",
        "link",
        "not()",
        "nth-child()",
        "nth-last-child()",
        "nth-last-of-type()",
        "nth-of-type()",
        "only-child",
        "only-of-type",
        "optional",
        "out-of-range",
        "placeholder",
        "read-only",
        "read-write",
        "required",
        "root",
        "selection",
        "target",
        "valid",
        "visited",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_css_extension() -> Vec<String> {
    vec![".css".to_string(), ".less".to_string(), ".scss".to_string()]
}

fn default_markup_extension() -> Vec<String> {
    [".vue", ".svelte", ".php", ".erb", ".twig", ".jinja", ".j2", ".njk", ".hbs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pseudo_selector_list: default_pseudo_selectors(),
            css_extension: default_css_extension(),
            markup_extension: default_markup_extension(),
            load_external_files: Vec::new(),
            use_emmet: false,
            emmet_scope: "text.html - source - meta.tag - comment".to_string(),
            html_attribute_scope: "text.html string.quoted".to_string(),
            css_completion_scope: "source.css - meta.property-value.css - comment - string, \
                 source.less - meta.property-value.less - meta.mixin-call.less - comment - string, \
                 source.scss - meta.property-value.scss - comment - string"
                .to_string(),
            project_file: None,
            cache_dir: None,
            ingest_interval_ms: 250,
        }
    }
}

impl Settings {
    pub fn load_from_dir(dir: &Path) -> Self {
        Self::load_from_path(&dir.join(SETTINGS_FILE_NAME))
    }

    /// Missing file gives defaults; unreadable or malformed warns and gives defaults
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", SETTINGS_FILE_NAME, e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", SETTINGS_FILE_NAME, e);
                Self::default()
            }
        }
    }

    /// Apply LSP `initializationOptions` on top of the file settings
    pub fn merge_json(&self, overrides: &serde_json::Value) -> Self {
        let mut base = match serde_json::to_value(self) {
            Ok(value) => value,
            Err(_) => return self.clone(),
        };
        if let (Some(target), Some(source)) = (base.as_object_mut(), overrides.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        match serde_json::from_value(base) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring invalid initialization options: {}", e);
                self.clone()
            }
        }
    }
}
