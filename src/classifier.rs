//! Caret-context predicates used by the completion router.
//!
//! Both checks only look at scope tags and the characters immediately
//! before the caret; neither parses attribute names or selectors.

use crate::host::View;
use crate::scope::ScopeSelector;

/// Whether the first caret sits inside the quoted value of `attribute`.
///
/// Walks backward from the caret, collecting characters until a space that
/// is not inside a string, then checks the collected text starts with the
/// attribute name.
pub fn at_html_attribute(
    attribute: &str,
    view: &dyn View,
    locations: &[usize],
    scope: &ScopeSelector,
) -> bool {
    let Some(&caret) = locations.first() else {
        return false;
    };
    if !view.match_selector(caret, scope) {
        return false;
    }

    let string = ScopeSelector::parse("string");
    let mut collected = Vec::new();
    let mut point = Some(caret);
    while let Some(p) = point {
        let ch = view.char_at(p);
        if ch == Some(' ') && view.score_selector(p, &string) == 0 {
            break;
        }
        if let Some(ch) = ch {
            collected.push(ch);
        }
        point = p.checked_sub(1);
    }

    let text: String = collected.into_iter().rev().collect();
    text.starts_with(attribute)
}

/// Whether the text just typed before the first caret starts with `symbol`,
/// e.g. `.btn` or `$gap`, with no whitespace in between.
pub fn at_style_symbol(
    symbol: char,
    scope: &ScopeSelector,
    view: &dyn View,
    locations: &[usize],
) -> bool {
    let Some(&caret) = locations.first() else {
        return false;
    };
    if !view.match_selector(caret, scope) {
        return false;
    }

    let mut collected = Vec::new();
    let mut point = caret.checked_sub(1);
    while let Some(p) = point {
        let Some(ch) = view.char_at(p) else {
            break;
        };
        collected.push(ch);
        if ch == symbol || matches!(ch, ' ' | '\t' | '\n') {
            break;
        }
        point = p.checked_sub(1);
    }

    collected.last() == Some(&symbol)
}
