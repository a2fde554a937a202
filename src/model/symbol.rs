use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Id,
    LessVar,
    LessMixin,
    ScssVar,
    ScssMixin,
    /// Served from the configured list, never extracted or cached
    PseudoSelector,
}

impl SymbolKind {
    /// Kinds the extractor produces and the cache stores
    pub const EXTRACTABLE: [SymbolKind; 6] = [
        SymbolKind::Class,
        SymbolKind::Id,
        SymbolKind::LessVar,
        SymbolKind::LessMixin,
        SymbolKind::ScssVar,
        SymbolKind::ScssMixin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Id => "id",
            SymbolKind::LessVar => "less_var",
            SymbolKind::LessMixin => "less_mixin",
            SymbolKind::ScssVar => "scss_var",
            SymbolKind::ScssMixin => "scss_mixin",
            SymbolKind::PseudoSelector => "pseudo_selector",
        }
    }
}

/// A completion candidate: display label (with provenance after a tab) and
/// the text inserted on accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub label: String,
    pub insertion: String,
}

impl CompletionEntry {
    pub fn new(label: impl Into<String>, insertion: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            insertion: insertion.into(),
        }
    }

    /// Build an entry whose label carries the originating file name
    pub fn with_source(display: &str, source: &str, insertion: impl Into<String>) -> Self {
        Self::new(format!("{}\t{}", display, source), insertion)
    }

    /// Label text before the provenance tab
    pub fn display(&self) -> &str {
        self.label.split('\t').next().unwrap_or(&self.label)
    }

    /// Provenance text after the tab, if any
    pub fn source(&self) -> Option<&str> {
        self.label.split_once('\t').map(|(_, source)| source.trim())
    }
}

/// Collapse identical (label, insertion) pairs, keeping first-seen order
pub fn dedup_entries(entries: impl IntoIterator<Item = CompletionEntry>) -> Vec<CompletionEntry> {
    let mut seen: HashSet<CompletionEntry> = HashSet::new();
    let mut result = Vec::new();
    for entry in entries {
        if seen.insert(entry.clone()) {
            result.push(entry);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_label_parts() {
        let entry = CompletionEntry::with_source("foo", "style.css", "foo");
        assert_eq!(entry.label, "foo\tstyle.css");
        assert_eq!(entry.display(), "foo");
        assert_eq!(entry.source(), Some("style.css"));

        let pseudo = CompletionEntry::new("hover\t pseudo selector", "hover");
        assert_eq!(pseudo.display(), "hover");
        assert_eq!(pseudo.source(), Some("pseudo selector"));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let a = CompletionEntry::new("a\tx.css", "a");
        let b = CompletionEntry::new("b\tx.css", "b");
        let deduped = dedup_entries(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(deduped, vec![a, b]);
    }

    #[test]
    fn test_same_label_different_insertion_is_kept() {
        let a = CompletionEntry::new("m\tx.less", "m;");
        let b = CompletionEntry::new("m\tx.less", "m();");
        assert_eq!(dedup_entries(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&SymbolKind::LessMixin).unwrap();
        assert_eq!(json, "\"less_mixin\"");
        assert_eq!(SymbolKind::ScssVar.as_str(), "scss_var");
    }
}
