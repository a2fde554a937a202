//! Completion routing: classify the caret, then resolve candidates from the
//! cache with a live fallback over the open buffers.

use tracing::debug;

use crate::cache::keys_of_view;
use crate::classifier::{at_html_attribute, at_style_symbol};
use crate::config::Settings;
use crate::context::AppContext;
use crate::host::{View, Window};
use crate::model::{dedup_entries, CompletionEntry, SymbolKind};
use crate::scope::ScopeSelector;

/// Which host completions to suppress alongside ours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionFlags {
    pub inhibit_word: bool,
    pub inhibit_explicit: bool,
}

impl CompletionFlags {
    pub const INHIBIT_WORD: Self = Self {
        inhibit_word: true,
        inhibit_explicit: false,
    };
    pub const INHIBIT_ALL: Self = Self {
        inhibit_word: true,
        inhibit_explicit: true,
    };
}

/// Outcome of classification: the kind to complete and the flags to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub kind: SymbolKind,
    pub flags: CompletionFlags,
}

impl Route {
    fn new(kind: SymbolKind, flags: CompletionFlags) -> Self {
        Self { kind, flags }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub kind: SymbolKind,
    pub entries: Vec<CompletionEntry>,
    pub flags: CompletionFlags,
}

/// Selectors parsed once from settings plus the fixed dialect selectors
#[derive(Debug, Clone)]
pub struct CompiledScopes {
    pub html_attribute: ScopeSelector,
    pub emmet: ScopeSelector,
    pub css_completion: ScopeSelector,
    pub less_source: ScopeSelector,
    pub less_mixin: ScopeSelector,
    pub scss_var: ScopeSelector,
    pub scss_mixin_include: ScopeSelector,
}

impl CompiledScopes {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            html_attribute: ScopeSelector::parse(&settings.html_attribute_scope),
            emmet: ScopeSelector::parse(&settings.emmet_scope),
            css_completion: ScopeSelector::parse(&settings.css_completion_scope),
            less_source: ScopeSelector::parse("source.less"),
            less_mixin: ScopeSelector::parse("source.less - parameter.less"),
            scss_var: ScopeSelector::parse("source.scss, meta.property-value.scss"),
            scss_mixin_include: ScopeSelector::parse(
                "meta.property-list.scss meta.at-rule.include.scss - punctuation.section.function.scss",
            ),
        }
    }
}

pub struct CompletionRouter<'a> {
    context: &'a AppContext,
}

impl<'a> CompletionRouter<'a> {
    pub fn new(context: &'a AppContext) -> Self {
        Self { context }
    }

    /// First matching context in priority order; `None` defers to the host
    pub fn classify(&self, view: &dyn View, locations: &[usize]) -> Option<Route> {
        use CompletionFlags as F;
        use SymbolKind::*;

        let scopes = &self.context.scopes;
        let use_emmet = self.context.settings.use_emmet;

        let route = if at_html_attribute("class", view, locations, &scopes.html_attribute) {
            Route::new(Class, F::INHIBIT_WORD)
        } else if at_html_attribute("id", view, locations, &scopes.html_attribute) {
            Route::new(Id, F::INHIBIT_WORD)
        } else if use_emmet && at_style_symbol('.', &scopes.emmet, view, locations) {
            Route::new(Class, F::INHIBIT_WORD)
        } else if use_emmet && at_style_symbol('#', &scopes.emmet, view, locations) {
            Route::new(Id, F::INHIBIT_WORD)
        } else if at_style_symbol(':', &scopes.css_completion, view, locations) {
            Route::new(PseudoSelector, F::INHIBIT_WORD)
        } else if at_style_symbol('.', &scopes.css_completion, view, locations) {
            Route::new(Class, F::INHIBIT_WORD)
        } else if at_style_symbol('#', &scopes.css_completion, view, locations) {
            Route::new(Id, F::INHIBIT_WORD)
        } else if at_style_symbol('@', &scopes.less_source, view, locations) {
            Route::new(LessVar, F::INHIBIT_ALL)
        } else if at_style_symbol('.', &scopes.less_mixin, view, locations) {
            Route::new(LessMixin, F::INHIBIT_ALL)
        } else if at_style_symbol('$', &scopes.scss_var, view, locations) {
            Route::new(ScssVar, F::INHIBIT_ALL)
        } else if locations
            .first()
            .is_some_and(|caret| view.match_selector(*caret, &scopes.scss_mixin_include))
        {
            Route::new(ScssMixin, F::INHIBIT_ALL)
        } else {
            return None;
        };
        Some(route)
    }

    /// Classify the caret and resolve its candidates
    pub fn route(
        &self,
        view: &dyn View,
        window: &dyn Window,
        locations: &[usize],
    ) -> Option<CompletionOutcome> {
        let route = self.classify(view, locations)?;
        debug!("Completing {} in {}", route.kind.as_str(), view.key_name());
        let entries = match route.kind {
            SymbolKind::PseudoSelector => self.return_pseudo_completions(),
            kind => self.return_symbol_completions(view, window, kind),
        };
        Some(CompletionOutcome {
            kind: route.kind,
            entries,
            flags: route.flags,
        })
    }

    /// Cached entries of `kind` visible from `view`: external files first,
    /// then the buffer's own file, then its project. A cold cache falls back
    /// to extracting every open buffer.
    pub fn return_symbol_completions(
        &self,
        view: &dyn View,
        window: &dyn Window,
        kind: SymbolKind,
    ) -> Vec<CompletionEntry> {
        let context = self.context;
        let store = &context.store;
        let keys = keys_of_view(view, window, &context.settings.css_extension, true);

        let mut entries: Vec<CompletionEntry> = Vec::new();
        for external in &context.external_files {
            if let Some(slice) = store.file_slice(external, kind, external) {
                entries.extend_from_slice(slice);
            }
        }
        if let Some(slice) = store.file_slice(&keys.file_key, kind, &keys.file_key) {
            entries.extend_from_slice(slice);
        }
        if let Some(project_key) = &keys.project_key {
            entries.extend(store.kind_entries(project_key, kind).into_iter().cloned());
        }

        if !entries.is_empty() {
            return dedup_entries(entries);
        }

        debug!("No cached {} entries, extracting open buffers", kind.as_str());
        let live = window
            .views()
            .into_iter()
            .flat_map(|open| context.extractor.extract(open, kind));
        dedup_entries(live)
    }

    /// The configured pseudo selector list, in order
    pub fn return_pseudo_completions(&self) -> Vec<CompletionEntry> {
        self.context
            .settings
            .pseudo_selector_list
            .iter()
            .map(|selector| CompletionEntry::new(format!("{}\t pseudo selector", selector), selector.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::host::{Document, WindowState};

    #[fixture]
    fn ctx() -> AppContext {
        AppContext::default()
    }

    fn at_caret(path: &str, source: &str) -> (Arc<Document>, usize) {
        let offset = source.chars().position(|c| c == '|').unwrap();
        let text = source.replacen('|', "", 1);
        (Arc::new(Document::from_path(Path::new(path), &text)), offset)
    }

    fn classify(ctx: &AppContext, path: &str, source: &str) -> Option<Route> {
        let (doc, offset) = at_caret(path, source);
        CompletionRouter::new(ctx).classify(doc.as_ref(), &[offset])
    }

    #[rstest]
    #[case("/w/i.html", r#"<div class="|"></div>"#, Some(SymbolKind::Class))]
    #[case("/w/i.html", r#"<div id="|"></div>"#, Some(SymbolKind::Id))]
    #[case("/w/i.html", r#"<div title="|"></div>"#, None)]
    #[case("/w/i.html", r#"<div class="|"#, Some(SymbolKind::Class))]
    #[case("/w/i.html", "<div class=\"a |\n<p></p>", Some(SymbolKind::Class))]
    #[case("/w/i.html", "<p id='|\n</p>", Some(SymbolKind::Id))]
    #[case("/w/a.css", "a:ho|", Some(SymbolKind::PseudoSelector))]
    #[case("/w/a.css", ".bt|", Some(SymbolKind::Class))]
    #[case("/w/a.css", "#ma|", Some(SymbolKind::Id))]
    #[case("/w/a.css", ".a { color: red; }|", None)]
    #[case("/w/a.css", ".a { color: #ff|", None)]
    #[case("/w/a.less", ".a { color: @|", Some(SymbolKind::LessVar))]
    #[case("/w/a.less", ".a { .mi|", Some(SymbolKind::LessMixin))]
    #[case("/w/a.less", ".bt|", Some(SymbolKind::Class))]
    #[case("/w/a.less", ".a { &:ho|", Some(SymbolKind::PseudoSelector))]
    #[case("/w/a.scss", ".a { &:ho|", Some(SymbolKind::PseudoSelector))]
    #[case("/w/a.scss", ".a { &:ho| }", Some(SymbolKind::PseudoSelector))]
    #[case("/w/a.scss", ".a { color: re|", None)]
    #[case("/w/a.scss", ".a { margin: $g|", Some(SymbolKind::ScssVar))]
    #[case("/w/a.scss", ".a { @include re| }", Some(SymbolKind::ScssMixin))]
    #[case("/w/a.scss", ".a { @include re(|1px) }", None)]
    fn test_classify_priority(
        ctx: AppContext,
        #[case] path: &str,
        #[case] source: &str,
        #[case] expected: Option<SymbolKind>,
    ) {
        assert_eq!(classify(&ctx, path, source).map(|r| r.kind), expected);
    }

    #[rstest]
    fn test_configured_markup_gets_attribute_routes(ctx: AppContext) {
        let source = r#"<template><div class="|"></div></template>"#;
        let offset = source.find('|').unwrap();
        let text = source.replacen('|', "", 1);
        let path = Path::new("/w/App.vue");
        let dialect = crate::model::Dialect::detect(path, &ctx.settings.markup_extension);
        let doc = Document::from_path_as(path, &text, dialect);
        let route = CompletionRouter::new(&ctx).classify(&doc, &[offset]).unwrap();
        assert_eq!(route.kind, SymbolKind::Class);
    }

    #[rstest]
    fn test_flags_by_branch(ctx: AppContext) {
        let class = classify(&ctx, "/w/a.css", ".bt|").unwrap();
        assert_eq!(class.flags, CompletionFlags::INHIBIT_WORD);
        let less = classify(&ctx, "/w/a.less", ".a { color: @|").unwrap();
        assert_eq!(less.flags, CompletionFlags::INHIBIT_ALL);
    }

    #[rstest]
    fn test_emmet_requires_setting(mut ctx: AppContext) {
        let source = "<p>div.it|";
        assert_eq!(classify(&ctx, "/w/i.html", source), None);

        let settings = Settings {
            use_emmet: true,
            ..Settings::default()
        };
        ctx.apply_settings(settings);
        let route = classify(&ctx, "/w/i.html", source).unwrap();
        assert_eq!(route.kind, SymbolKind::Class);
        assert_eq!(route.flags, CompletionFlags::INHIBIT_WORD);
    }

    #[rstest]
    fn test_pseudo_completions(ctx: AppContext) {
        let router = CompletionRouter::new(&ctx);
        let entries = router.return_pseudo_completions();
        assert_eq!(entries.len(), ctx.settings.pseudo_selector_list.len());
        assert_eq!(entries[0].label, "active\t pseudo selector");
        assert_eq!(entries[0].insertion, "active");
    }

    #[rstest]
    fn test_cached_entries_are_unioned(mut ctx: AppContext) {
        let style = Arc::new(Document::from_path(Path::new("/w/style.css"), ".foo{} #bar{}"));
        let other = Arc::new(Document::from_path(Path::new("/w/other.css"), ".baz{}"));
        let window = WindowState::new(None, vec!["/w".into()], Vec::new());
        ctx.save_cache(style.as_ref(), &window);
        ctx.save_cache(other.as_ref(), &window);

        let (page, _) = at_caret("/w/index.html", "<div class=\"|\"></div>");
        let router = CompletionRouter::new(&ctx);
        let mut labels: Vec<_> = router
            .return_symbol_completions(page.as_ref(), &window, SymbolKind::Class)
            .into_iter()
            .map(|e| e.label)
            .collect();
        labels.sort();
        assert_eq!(labels, vec!["baz\tother.css", "foo\tstyle.css"]);
    }

    #[rstest]
    fn test_external_files_come_first(mut ctx: AppContext) {
        let external = Document::scratch("/lib/base.css".into(), crate::model::Dialect::Css, ".ext{}", true);
        let window = WindowState::new(None, vec!["/w".into()], Vec::new());
        ctx.save_cache(&external, &window);
        let style = Document::from_path(Path::new("/w/style.css"), ".own{}");
        ctx.save_cache(&style, &window);
        let ctx = ctx.with_external_files(vec!["/lib/base.css".into()]);

        let router = CompletionRouter::new(&ctx);
        let entries = router.return_symbol_completions(&style, &window, SymbolKind::Class);
        let insertions: Vec<_> = entries.iter().map(|e| e.insertion.as_str()).collect();
        assert_eq!(insertions, vec!["ext", "own"]);
    }

    #[rstest]
    fn test_cold_cache_falls_back_to_open_buffers(mut ctx: AppContext) {
        let style = Arc::new(Document::from_path(Path::new("/w/style.css"), ".foo{}"));
        let window = WindowState::new(None, vec!["/w".into()], vec![style.clone()]);
        ctx.save_cache(style.as_ref(), &window);
        ctx.remove_cache();
        assert!(ctx.store.projects().is_empty());

        let (page, offset) = at_caret("/w/index.html", "<div class=\"|\"></div>");
        let window = window.with_documents(vec![style.clone(), page.clone()]);
        let outcome = CompletionRouter::new(&ctx)
            .route(page.as_ref(), &window, &[offset])
            .unwrap();
        assert_eq!(outcome.kind, SymbolKind::Class);
        assert!(outcome.entries.iter().any(|e| e.insertion == "foo"));
    }
}
