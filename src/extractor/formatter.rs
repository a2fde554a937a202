use crate::host::View;
use crate::model::{CompletionEntry, Span};

/// `[A-Za-z_-][A-Za-z0-9_-]*`, plus non-ASCII, with no digit after leading dashes
pub fn is_identifier(name: &str) -> bool {
    let body = name.trim_start_matches('-');
    let Some(first) = body.chars().next() else {
        return false;
    };
    if first.is_ascii_digit() {
        return false;
    }
    name.chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii())
}

fn strip_sigil(view: &dyn View, span: Span, sigil: char) -> Option<String> {
    let text = view.substr(span);
    let name = text.strip_prefix(sigil)?;
    is_identifier(name).then(|| name.to_string())
}

enum Params {
    Absent,
    Group(String),
    Unbalanced,
}

/// Parenthesised parameter list starting at `from`, spaces allowed before `(`
fn params_after(view: &dyn View, from: usize) -> Params {
    let mut i = from;
    while matches!(view.char_at(i), Some(' ' | '\t')) {
        i += 1;
    }
    if view.char_at(i) != Some('(') {
        return Params::Absent;
    }

    let mut depth = 0usize;
    let mut group = String::new();
    while let Some(c) = view.char_at(i) {
        group.push(c);
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Params::Group(group);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Params::Unbalanced
}

/// Parameter names without default values, and the separator they used
fn parameter_names(group: &str) -> (Vec<String>, char) {
    let inner = group
        .strip_prefix('(')
        .and_then(|g| g.strip_suffix(')'))
        .unwrap_or(group);
    let separator = if inner.contains(';') { ';' } else { ',' };
    let names = inner
        .split(separator)
        .map(|param| param.split(':').next().unwrap_or(param).trim().to_string())
        .filter(|param| !param.is_empty())
        .collect();
    (names, separator)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn call_text(name: &str, group: &str) -> String {
    let (names, separator) = parameter_names(group);
    format!("{}({})", name, names.join(&format!("{} ", separator)))
}

pub(super) fn class(view: &dyn View, span: Span, source: &str) -> Option<Vec<CompletionEntry>> {
    let name = strip_sigil(view, span, '.')?;
    Some(vec![CompletionEntry::with_source(&name, source, name.clone())])
}

pub(super) fn id(view: &dyn View, span: Span, source: &str) -> Option<Vec<CompletionEntry>> {
    let name = strip_sigil(view, span, '#')?;
    Some(vec![CompletionEntry::with_source(&name, source, name.clone())])
}

pub(super) fn less_var(view: &dyn View, span: Span, source: &str) -> Option<Vec<CompletionEntry>> {
    let name = strip_sigil(view, span, '@')?;
    Some(vec![CompletionEntry::with_source(
        &format!("@{}", name),
        source,
        name,
    )])
}

pub(super) fn scss_var(view: &dyn View, span: Span, source: &str) -> Option<Vec<CompletionEntry>> {
    let name = strip_sigil(view, span, '$')?;
    Some(vec![CompletionEntry::with_source(
        &format!("${}", name),
        source,
        name,
    )])
}

pub(super) fn less_mixin(view: &dyn View, span: Span, source: &str) -> Option<Vec<CompletionEntry>> {
    let name = strip_sigil(view, span, '.')?;
    let entry = match params_after(view, span.end) {
        Params::Absent => CompletionEntry::with_source(&name, source, format!("{};", name)),
        Params::Group(group) => CompletionEntry::with_source(
            &format!("{}{}", name, collapse_whitespace(&group)),
            source,
            format!("{};", call_text(&name, &group)),
        ),
        Params::Unbalanced => return None,
    };
    Some(vec![entry])
}

pub(super) fn scss_mixin(view: &dyn View, span: Span, source: &str) -> Option<Vec<CompletionEntry>> {
    let name = view.substr(span);
    if !is_identifier(&name) {
        return None;
    }
    let entry = match params_after(view, span.end) {
        Params::Absent => CompletionEntry::with_source(&name, source, name.clone()),
        Params::Group(group) => CompletionEntry::with_source(
            &format!("{}{}", name, collapse_whitespace(&group)),
            source,
            call_text(&name, &group),
        ),
        Params::Unbalanced => return None,
    };
    Some(vec![entry])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Document;
    use crate::model::Dialect;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("btn-primary"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("-webkit-thing"));
        assert!(is_identifier("größe"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("-"));
        assert!(!is_identifier("2col"));
        assert!(!is_identifier("-2col"));
        assert!(!is_identifier("a.b"));
    }

    #[test]
    fn test_parameter_names() {
        assert_eq!(
            parameter_names("(@w; @c: red)"),
            (vec!["@w".to_string(), "@c".to_string()], ';')
        );
        assert_eq!(
            parameter_names("($x, $y: 1)"),
            (vec!["$x".to_string(), "$y".to_string()], ',')
        );
        assert_eq!(parameter_names("()"), (Vec::<String>::new(), ','));
    }

    #[test]
    fn test_unbalanced_params_are_skipped() {
        let view = Document::new(None, "x.less".into(), Dialect::Plain, ".m(@a");
        assert!(less_mixin(&view, Span::new(0, 2), "x.less").is_none());
    }

    #[test]
    fn test_wrong_sigil_is_skipped() {
        let view = Document::new(None, "x.css".into(), Dialect::Plain, "#foo");
        assert!(class(&view, Span::new(0, 4), "x.css").is_none());
        assert!(id(&view, Span::new(0, 4), "x.css").is_some());
    }
}
