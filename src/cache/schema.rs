use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{CompletionEntry, SymbolKind};

/// Symbol kind -> originating file path -> entries
pub type CacheEntry = HashMap<SymbolKind, HashMap<String, Vec<CompletionEntry>>>;

/// Cache key (file path or project identity) -> entry
pub type ProjectsCache = HashMap<String, CacheEntry>;

/// One persisted shard: a single cache key and its entry
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedShard {
    pub key: String,
    pub entry: CacheEntry,
}

/// Borrowed form of [`CachedShard`] used when writing
#[derive(Serialize)]
pub struct CachedShardRef<'a> {
    pub key: &'a str,
    pub entry: &'a CacheEntry,
}

/// Drop empty file lists and empty kinds so no key maps to an empty list
pub fn prune(entry: &mut CacheEntry) {
    for files in entry.values_mut() {
        files.retain(|_, entries| !entries.is_empty());
    }
    entry.retain(|_, files| !files.is_empty());
}

/// Replace the slice of `kind` contributed by `file`; empty results remove it
pub fn replace_slice(entry: &mut CacheEntry, kind: SymbolKind, file: &str, entries: Vec<CompletionEntry>) {
    if entries.is_empty() {
        if let Some(files) = entry.get_mut(&kind) {
            files.remove(file);
            if files.is_empty() {
                entry.remove(&kind);
            }
        }
    } else {
        entry.entry(kind).or_default().insert(file.to_string(), entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_slice_never_stores_empty_lists() {
        let mut entry = CacheEntry::new();
        replace_slice(
            &mut entry,
            SymbolKind::Class,
            "/a.css",
            vec![CompletionEntry::new("a\ta.css", "a")],
        );
        assert_eq!(entry[&SymbolKind::Class]["/a.css"].len(), 1);

        replace_slice(&mut entry, SymbolKind::Class, "/a.css", Vec::new());
        assert!(entry.is_empty());

        replace_slice(&mut entry, SymbolKind::Id, "/a.css", Vec::new());
        assert!(entry.is_empty());
    }

    #[test]
    fn test_prune() {
        let mut entry = CacheEntry::new();
        entry.entry(SymbolKind::Id).or_default().insert("/x.css".into(), Vec::new());
        entry
            .entry(SymbolKind::Class)
            .or_default()
            .insert("/x.css".into(), vec![CompletionEntry::new("x\tx.css", "x")]);
        prune(&mut entry);
        assert_eq!(entry.len(), 1);
        assert!(entry.contains_key(&SymbolKind::Class));
    }
}
