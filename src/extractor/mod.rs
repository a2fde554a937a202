//! Symbol extraction: one (scope selector, formatter) rule per symbol kind.

mod formatter;

use tracing::debug;

use crate::host::View;
use crate::model::{dedup_entries, CompletionEntry, Span, SymbolKind};
use crate::scope::ScopeSelector;

pub use formatter::is_identifier;

/// Turns a matched region into completion entries; `None` skips the region
pub type Formatter = fn(&dyn View, Span, &str) -> Option<Vec<CompletionEntry>>;

#[derive(Clone, Copy)]
pub struct ExtractionRule {
    pub selector: &'static str,
    pub format: Formatter,
}

/// Extraction rule of a kind; pseudo selectors come from settings instead
pub fn rule_for(kind: SymbolKind) -> Option<ExtractionRule> {
    let rule = match kind {
        SymbolKind::Class => ExtractionRule {
            selector: "entity.other.attribute-name.class",
            format: formatter::class,
        },
        SymbolKind::Id => ExtractionRule {
            selector: "entity.other.attribute-name.id",
            format: formatter::id,
        },
        SymbolKind::LessVar => ExtractionRule {
            selector: "variable.declaration.less",
            format: formatter::less_var,
        },
        SymbolKind::LessMixin => ExtractionRule {
            selector: "entity.other.attribute-name.mixin.less, source.less entity.other.attribute-name.class",
            format: formatter::less_mixin,
        },
        SymbolKind::ScssVar => ExtractionRule {
            selector: "variable.declaration.scss",
            format: formatter::scss_var,
        },
        SymbolKind::ScssMixin => ExtractionRule {
            selector: "entity.name.function.scss",
            format: formatter::scss_mixin,
        },
        SymbolKind::PseudoSelector => return None,
    };
    Some(rule)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolExtractor;

impl SymbolExtractor {
    pub fn new() -> Self {
        Self
    }

    /// All entries of `kind` in the buffer, deduplicated
    pub fn extract(&self, view: &dyn View, kind: SymbolKind) -> Vec<CompletionEntry> {
        let Some(rule) = rule_for(kind) else {
            return Vec::new();
        };
        let selector = ScopeSelector::parse(rule.selector);
        let source = view.base_name();

        let mut entries = Vec::new();
        for span in view.find_by_selector(&selector) {
            match (rule.format)(view, span, &source) {
                Some(found) => entries.extend(found),
                None => debug!(
                    "Skipping malformed {} at {}..{} in {}",
                    kind.as_str(),
                    span.start,
                    span.end,
                    source
                ),
            }
        }
        dedup_entries(entries)
    }

    /// Extraction of every cacheable kind
    pub fn extract_all(&self, view: &dyn View) -> Vec<(SymbolKind, Vec<CompletionEntry>)> {
        SymbolKind::EXTRACTABLE
            .iter()
            .map(|kind| (*kind, self.extract(view, *kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::host::Document;
    use crate::model::Dialect;

    fn doc(name: &str, text: &str) -> Document {
        Document::from_path(std::path::Path::new(name), text)
    }

    fn labels(entries: &[CompletionEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_style_css_scenario() {
        let view = doc("/site/style.css", ".foo{} #bar{}");
        let extractor = SymbolExtractor::new();

        let classes = extractor.extract(&view, SymbolKind::Class);
        assert_eq!(classes, vec![CompletionEntry::new("foo\tstyle.css", "foo")]);

        let ids = extractor.extract(&view, SymbolKind::Id);
        assert_eq!(ids, vec![CompletionEntry::new("bar\tstyle.css", "bar")]);
    }

    #[test]
    fn test_extraction_is_idempotent_and_deduplicated() {
        let view = doc("/site/a.css", ".a, .b {} .a:hover {} .b .a {}");
        let extractor = SymbolExtractor::new();

        let first = extractor.extract(&view, SymbolKind::Class);
        let second = extractor.extract(&view, SymbolKind::Class);
        let as_set = |v: &[CompletionEntry]| v.iter().cloned().collect::<HashSet<_>>();
        assert_eq!(as_set(&first), as_set(&second));
        assert_eq!(first.len(), 2);
        assert_eq!(as_set(&first).len(), first.len());
    }

    #[test]
    fn test_less_kinds() {
        let view = doc(
            "/site/mix.less",
            "@size: 2px;\n.border(@w; @c: red) { border: @w solid @c; }\n.rounded { }",
        );
        let extractor = SymbolExtractor::new();

        let vars = extractor.extract(&view, SymbolKind::LessVar);
        assert_eq!(vars, vec![CompletionEntry::new("@size\tmix.less", "size")]);

        let mixins = extractor.extract(&view, SymbolKind::LessMixin);
        assert_eq!(
            labels(&mixins),
            vec!["border(@w; @c: red)\tmix.less", "rounded\tmix.less"]
        );
        assert_eq!(mixins[0].insertion, "border(@w; @c);");
        assert_eq!(mixins[1].insertion, "rounded;");

        // parametric mixins are not plain classes
        let classes = extractor.extract(&view, SymbolKind::Class);
        assert_eq!(labels(&classes), vec!["rounded\tmix.less"]);
    }

    #[test]
    fn test_scss_kinds() {
        let view = doc(
            "/site/_vars.scss",
            "$gap: 4px;\n@mixin pad($x, $y: 1) { padding: $x $y; }\n@mixin reset { margin: 0; }",
        );
        let extractor = SymbolExtractor::new();

        let vars = extractor.extract(&view, SymbolKind::ScssVar);
        assert_eq!(vars, vec![CompletionEntry::new("$gap\t_vars.scss", "gap")]);

        let mixins = extractor.extract(&view, SymbolKind::ScssMixin);
        assert_eq!(
            mixins,
            vec![
                CompletionEntry::new("pad($x, $y: 1)\t_vars.scss", "pad($x, $y)"),
                CompletionEntry::new("reset\t_vars.scss", "reset"),
            ]
        );
    }

    #[test]
    fn test_embedded_style_in_markup() {
        let view = doc("/site/index.html", "<style>.hero {}</style><div class=\"x\"></div>");
        let classes = SymbolExtractor::new().extract(&view, SymbolKind::Class);
        assert_eq!(classes, vec![CompletionEntry::new("hero\tindex.html", "hero")]);
    }

    #[test]
    fn test_pseudo_selector_is_not_extracted() {
        let view = doc("/site/a.css", "a:hover {}");
        assert!(SymbolExtractor::new().extract(&view, SymbolKind::PseudoSelector).is_empty());
        assert!(rule_for(SymbolKind::PseudoSelector).is_none());
    }

    #[test]
    fn test_extract_all_covers_every_kind() {
        let view = Document::scratch("/ext/x.scss".into(), Dialect::Scss, "$a: 1;", true);
        let all = SymbolExtractor::new().extract_all(&view);
        assert_eq!(all.len(), SymbolKind::EXTRACTABLE.len());
        let scss_vars = all.iter().find(|(k, _)| *k == SymbolKind::ScssVar).unwrap();
        assert_eq!(scss_vars.1, vec![CompletionEntry::new("$a\tx.scss", "a")]);
    }
}
