use tower_lsp::lsp_types::*;

use crate::model::{CompletionEntry, SymbolKind};
use crate::router::CompletionOutcome;

pub struct CompletionHandler;

impl CompletionHandler {
    /// Convert a routed outcome into an LSP completion list, keeping the
    /// router's order through `sort_text`.
    ///
    /// Routes that inhibit explicit completions own the caret: their list is
    /// final and its first item is preselected. Other routes leave the list
    /// incomplete so the client re-queries and merges its own candidates.
    pub fn to_response(outcome: CompletionOutcome) -> CompletionResponse {
        let kind = item_kind(outcome.kind);
        let exclusive = outcome.flags.inhibit_explicit;
        let items = outcome
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let mut item = to_item(entry, kind, i);
                if exclusive && i == 0 {
                    item.preselect = Some(true);
                }
                item
            })
            .collect();

        CompletionResponse::List(CompletionList {
            is_incomplete: !exclusive,
            items,
        })
    }
}

fn item_kind(kind: SymbolKind) -> CompletionItemKind {
    match kind {
        SymbolKind::Class => CompletionItemKind::CLASS,
        SymbolKind::Id => CompletionItemKind::REFERENCE,
        SymbolKind::LessVar | SymbolKind::ScssVar => CompletionItemKind::VARIABLE,
        SymbolKind::LessMixin | SymbolKind::ScssMixin => CompletionItemKind::FUNCTION,
        SymbolKind::PseudoSelector => CompletionItemKind::KEYWORD,
    }
}

fn to_item(entry: &CompletionEntry, kind: CompletionItemKind, index: usize) -> CompletionItem {
    let source = entry.source().filter(|s| !s.is_empty());
    CompletionItem {
        label: entry.display().to_string(),
        kind: Some(kind),
        label_details: source.map(|source| CompletionItemLabelDetails {
            detail: None,
            description: Some(source.to_string()),
        }),
        detail: source.map(str::to_string),
        insert_text: Some(entry.insertion.clone()),
        filter_text: Some(entry.insertion.clone()),
        sort_text: Some(format!("{:05}", index)),
        ..Default::default()
    }
}
