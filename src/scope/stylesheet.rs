use crate::model::Dialect;

use super::map::ScopeBuilder;

/// Tag the stylesheet text in `chars[start..end]`.
///
/// A lexical pass, not a grammar: statements are split on `{`, `;` and `}`
/// outside strings, comments and parentheses. A statement followed by `{` is
/// a selector (or block at-rule), anything else inside a block is a
/// declaration.
pub fn tag_stylesheet(
    chars: &[char],
    start: usize,
    end: usize,
    dialect: Dialect,
    builder: &mut ScopeBuilder,
) {
    let end = end.min(chars.len());
    let limit = if end >= builder.len() {
        builder.unterminated_end()
    } else {
        end
    };
    let mut tagger = StyleTagger {
        chars,
        begin: start,
        end,
        limit,
        dialect,
        builder,
    };
    tagger.block(start, false);
}

struct StyleTagger<'a> {
    chars: &'a [char],
    begin: usize,
    end: usize,
    /// Exclusive end given to scopes left open at `end`
    limit: usize,
    dialect: Dialect,
    builder: &'a mut ScopeBuilder,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

/// Characters that can only start a selector, never a property
fn is_selector_lead(c: char) -> bool {
    matches!(c, '&' | '>' | '+' | '~' | '[' | ':')
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

impl StyleTagger<'_> {
    fn at(&self, i: usize) -> Option<char> {
        if i < self.end { Some(self.chars[i]) } else { None }
    }

    fn scope(&self, name: &str) -> String {
        format!("{}.{}", name, self.dialect.suffix())
    }

    fn limit_for(&self, stop: usize) -> usize {
        if stop >= self.end { self.limit } else { stop }
    }

    fn ident_end(&self, mut i: usize) -> usize {
        while self.at(i).is_some_and(is_ident_char) {
            i += 1;
        }
        i
    }

    fn skip_whitespace(&self, mut i: usize, stop: usize) -> usize {
        while i < stop && self.chars[i].is_whitespace() {
            i += 1;
        }
        i
    }

    fn string_end(&self, i: usize) -> usize {
        let quote = self.chars[i];
        let mut j = i + 1;
        while let Some(c) = self.at(j) {
            match c {
                '\\' => j += 2,
                '\n' => return j,
                c if c == quote => return j + 1,
                _ => j += 1,
            }
        }
        self.end
    }

    /// End of a comment starting at `i`, and whether it is a block comment
    fn comment_end(&self, i: usize) -> Option<(usize, bool)> {
        if self.at(i) != Some('/') {
            return None;
        }
        match self.at(i + 1) {
            Some('*') => {
                let mut j = i + 2;
                while j < self.end {
                    if self.chars[j] == '*' && self.at(j + 1) == Some('/') {
                        return Some((j + 2, true));
                    }
                    j += 1;
                }
                Some((self.end, true))
            }
            Some('/') if self.dialect != Dialect::Css && self.line_comment_allowed(i) => {
                let mut j = i + 2;
                while self.at(j).is_some_and(|c| c != '\n') {
                    j += 1;
                }
                Some((j, false))
            }
            _ => None,
        }
    }

    // `//` inside `url(//cdn/...)` is not a comment
    fn line_comment_allowed(&self, i: usize) -> bool {
        i == self.begin
            || matches!(self.chars[i - 1], ';' | '{' | '}' | ',')
            || self.chars[i - 1].is_whitespace()
    }

    /// End of `#{...}` (SCSS) or `@{...}` (LESS) interpolation at `i`
    fn interpolation_end(&self, i: usize) -> Option<usize> {
        let sigil = match self.dialect {
            Dialect::Scss => '#',
            Dialect::Less => '@',
            _ => return None,
        };
        if self.at(i) != Some(sigil) || self.at(i + 1) != Some('{') {
            return None;
        }
        let mut j = i + 2;
        while let Some(c) = self.at(j) {
            if c == '}' {
                return Some(j + 1);
            }
            j += 1;
        }
        Some(self.end)
    }

    fn tag_string(&mut self, i: usize) -> usize {
        let end = self.string_end(i);
        let name = if self.chars[i] == '\'' {
            "string.quoted.single"
        } else {
            "string.quoted.double"
        };
        let scope = self.scope(name);
        self.builder.token(scope, i, end);
        end
    }

    fn tag_comment(&mut self, i: usize) -> Option<usize> {
        let (end, block) = self.comment_end(i)?;
        let name = if block { "comment.block" } else { "comment.line" };
        let scope = self.scope(name);
        let scope_end = if end >= self.end { self.limit } else { end };
        self.builder.token(scope, i, scope_end);
        Some(end)
    }

    fn skip_trivia(&mut self, mut i: usize) -> usize {
        while let Some(c) = self.at(i) {
            if c.is_whitespace() {
                i += 1;
            } else if let Some(end) = self.tag_comment(i) {
                i = end;
            } else {
                break;
            }
        }
        i
    }

    /// First `{`, `;` or `}` at paren depth 0 from `i`
    fn find_terminator(&self, i: usize) -> (Option<char>, usize) {
        let mut depth = 0usize;
        let mut j = i;
        while let Some(c) = self.at(j) {
            if c == '"' || c == '\'' {
                j = self.string_end(j);
                continue;
            }
            if let Some((end, _)) = self.comment_end(j) {
                j = end;
                continue;
            }
            if let Some(end) = self.interpolation_end(j) {
                j = end;
                continue;
            }
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '{' | ';' | '}' if depth == 0 => return (Some(c), j),
                _ => {}
            }
            j += 1;
        }
        (None, self.end)
    }

    fn matching_paren(&self, i: usize, stop: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut j = i;
        while j < stop {
            let c = self.chars[j];
            if c == '"' || c == '\'' {
                j = self.string_end(j);
                continue;
            }
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(j);
                    }
                }
                _ => {}
            }
            j += 1;
        }
        None
    }

    /// Scan statements until the `}` closing a nested block (returned) or the end
    fn block(&mut self, mut i: usize, nested: bool) -> usize {
        loop {
            i = self.skip_trivia(i);
            let Some(c) = self.at(i) else {
                return self.end;
            };
            match c {
                '}' if nested => return i,
                '}' | ';' => {
                    i += 1;
                    continue;
                }
                _ => {}
            }

            let (terminator, term) = self.find_terminator(i);
            match terminator {
                Some('{') => {
                    self.prelude(i, term);
                    let scope = self.scope("meta.property-list");
                    self.builder.open(scope, term);
                    let close = self.block(term + 1, true);
                    if self.at(close) == Some('}') {
                        self.builder.close(close + 1);
                        i = close + 1;
                    } else {
                        self.builder.close(self.limit);
                        return self.end;
                    }
                }
                Some(';') => {
                    self.statement(i, term, term + 1, nested, true);
                    i = term + 1;
                }
                Some(_) => {
                    self.statement(i, term, term, nested, false);
                    i = term;
                }
                None => {
                    self.statement(i, self.end, self.limit, nested, false);
                    return self.end;
                }
            }
        }
    }

    fn prelude(&mut self, i: usize, stop: usize) {
        if i >= stop {
            return;
        }
        if self.chars[i] == '@' {
            self.at_rule(i, stop, stop);
        } else {
            self.selector(i, stop);
        }
    }

    fn statement(&mut self, i: usize, stop: usize, span_end: usize, nested: bool, semicolon: bool) {
        let c = self.chars[i];
        match (c, self.dialect) {
            ('@', Dialect::Less) | ('$', Dialect::Scss) => {
                let name_end = self.ident_end(i + 1);
                let colon = self.skip_whitespace(name_end, stop);
                if name_end > i + 1 && self.at(colon) == Some(':') && colon < stop {
                    let scope = self.scope("variable.declaration");
                    self.builder.token(scope, i, name_end);
                    self.value(colon + 1, stop, span_end);
                } else if c == '@' {
                    self.at_rule(i, stop, span_end);
                } else {
                    self.values(i, stop, None);
                }
            }
            ('@', _) => self.at_rule(i, stop, span_end),
            ('.' | '#', Dialect::Less) if nested || semicolon => {
                let scope = self.scope("meta.mixin-call");
                self.builder.open(scope, i);
                self.values(i, stop, Some("parameter.less"));
                self.builder.close(span_end);
            }
            _ if !nested || is_selector_lead(c) => self.selector(i, stop),
            _ => self.declaration(i, stop, span_end),
        }
    }

    fn declaration(&mut self, i: usize, stop: usize, span_end: usize) {
        let mut depth = 0usize;
        let mut j = i;
        while j < stop {
            let c = self.chars[j];
            if c == '"' || c == '\'' {
                j = self.string_end(j);
                continue;
            }
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ':' if depth == 0 => {
                    let scope = self.scope("support.type.property-name");
                    self.builder.token(scope, i, j);
                    self.value(j + 1, stop, span_end);
                    return;
                }
                _ => {}
            }
            j += 1;
        }
        // No colon: a nested selector still being typed
        self.selector(i, stop);
    }

    fn value(&mut self, start: usize, stop: usize, span_end: usize) {
        let scope = self.scope("meta.property-value");
        self.builder.open(scope, start);
        let parens = match self.dialect {
            Dialect::Less => Some("parameter.less"),
            _ => None,
        };
        self.values(start, stop, parens);
        self.builder.close(span_end);
    }

    /// Tag strings, comments and variable references; paren groups get
    /// `paren_scope` when given.
    fn values(&mut self, start: usize, stop: usize, paren_scope: Option<&str>) {
        let mut j = start;
        while j < stop {
            let c = self.chars[j];
            if c == '"' || c == '\'' {
                j = self.tag_string(j);
                continue;
            }
            if let Some(end) = self.tag_comment(j) {
                j = end;
                continue;
            }
            if let Some(end) = self.interpolation_end(j) {
                j = end;
                continue;
            }
            match (c, self.dialect) {
                ('@', Dialect::Less) | ('$', Dialect::Scss) => {
                    let end = self.ident_end(j + 1);
                    if end > j + 1 {
                        let scope = self.scope("variable.other");
                        self.builder.token(scope, j, end);
                        j = end;
                        continue;
                    }
                }
                ('(', _) => {
                    if let Some(scope) = paren_scope {
                        let close = self.matching_paren(j, stop);
                        let inner_end = close.unwrap_or(stop);
                        self.builder.open(scope, j);
                        self.values(j + 1, inner_end, paren_scope);
                        let group_end = close.map(|p| p + 1).unwrap_or(self.limit_for(stop));
                        self.builder.close(group_end);
                        j = close.map(|p| p + 1).unwrap_or(stop);
                        continue;
                    }
                }
                _ => {}
            }
            j += 1;
        }
    }

    fn at_rule(&mut self, i: usize, stop: usize, span_end: usize) {
        let name_end = self.ident_end(i + 1);
        let name: String = self.chars[i + 1..name_end].iter().collect();
        let rule_scope = self.scope("keyword.control.at-rule");
        self.builder.token(rule_scope, i, name_end);

        match (self.dialect, name.as_str()) {
            (Dialect::Scss, "mixin") => {
                let start = self.skip_whitespace(name_end, stop);
                let end = self.ident_end(start).min(stop);
                if end > start {
                    let scope = self.scope("entity.name.function");
                    self.builder.token(scope, start, end);
                }
                self.values(end, stop, None);
            }
            (Dialect::Scss, "include") => {
                let scope = self.scope("meta.at-rule.include");
                self.builder.open(scope, i);
                self.values(name_end, stop, Some("punctuation.section.function.scss"));
                self.builder.close(span_end);
            }
            _ => self.values(name_end, stop, None),
        }
    }

    fn selector(&mut self, start: usize, stop: usize) {
        // (node, end) of the last class token, to spot LESS `.mixin(` definitions
        let mut last_class: Option<(usize, usize)> = None;
        let mut k = start;
        while k < stop {
            let c = self.chars[k];
            if c == '"' || c == '\'' {
                k = self.tag_string(k);
                continue;
            }
            if let Some(end) = self.tag_comment(k) {
                k = end;
                continue;
            }
            if let Some(end) = self.interpolation_end(k) {
                k = end;
                continue;
            }
            match c {
                '.' | '#' if self.at(k + 1).is_some_and(is_ident_start) => {
                    let end = self.ident_end(k + 1).min(stop);
                    let name = if c == '.' {
                        "entity.other.attribute-name.class"
                    } else {
                        "entity.other.attribute-name.id"
                    };
                    let scope = self.scope(name);
                    let node = self.builder.token(scope, k, end);
                    if c == '.' {
                        last_class = Some((node, end));
                    }
                    k = end;
                    continue;
                }
                ':' => {
                    let mut end = k + 1;
                    let name = if self.at(end) == Some(':') {
                        end += 1;
                        "entity.other.pseudo-element"
                    } else {
                        "entity.other.pseudo-class"
                    };
                    end = self.ident_end(end).min(stop);
                    let scope = self.scope(name);
                    self.builder.token(scope, k, end);
                    k = end;
                    continue;
                }
                '@' if self.dialect == Dialect::Less => {
                    let end = self.ident_end(k + 1).min(stop);
                    if end > k + 1 {
                        let scope = self.scope("variable.other");
                        self.builder.token(scope, k, end);
                        k = end;
                        continue;
                    }
                }
                '(' => {
                    let close = self.matching_paren(k, stop);
                    let inner_end = close.unwrap_or(stop);
                    let group_end = close.map(|p| p + 1).unwrap_or(stop);
                    match last_class {
                        Some((node, end)) if self.dialect == Dialect::Less && end == k => {
                            self.builder
                                .rename(node, "entity.other.attribute-name.mixin.less");
                            self.builder.open("parameter.less", k);
                            self.values(k + 1, inner_end, None);
                            let scope_end = close.map(|p| p + 1).unwrap_or(self.limit_for(stop));
                            self.builder.close(scope_end);
                        }
                        _ => self.selector(k + 1, inner_end),
                    }
                    k = group_end;
                    continue;
                }
                _ => {}
            }
            k += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Span;
    use crate::scope::{ScopeMap, ScopeSelector};

    fn tag(source: &str, dialect: Dialect) -> (Vec<char>, ScopeMap) {
        let chars: Vec<char> = source.chars().collect();
        let mut builder = ScopeBuilder::new(dialect.base_scope(), chars.len());
        tag_stylesheet(&chars, 0, chars.len(), dialect, &mut builder);
        (chars, builder.finish())
    }

    fn texts(chars: &[char], map: &ScopeMap, selector: &str) -> Vec<String> {
        map.find_by_selector(&ScopeSelector::parse(selector))
            .into_iter()
            .map(|Span { start, end }| chars[start..end.min(chars.len())].iter().collect())
            .collect()
    }

    #[test]
    fn test_css_class_and_id_selectors() {
        let (chars, map) = tag(".foo{} #bar{}", Dialect::Css);
        assert_eq!(texts(&chars, &map, "entity.other.attribute-name.class"), vec![".foo"]);
        assert_eq!(texts(&chars, &map, "entity.other.attribute-name.id"), vec!["#bar"]);
    }

    #[test]
    fn test_hex_colors_in_values_are_not_ids() {
        let source = "a.btn > .icon:hover { color: #fff; background: url(x.png); }";
        let (chars, map) = tag(source, Dialect::Css);
        assert_eq!(
            texts(&chars, &map, "entity.other.attribute-name.class"),
            vec![".btn", ".icon"]
        );
        assert!(texts(&chars, &map, "entity.other.attribute-name.id").is_empty());
        assert_eq!(texts(&chars, &map, "entity.other.pseudo-class"), vec![":hover"]);

        let hash = source.find('#').unwrap();
        assert!(map.stack_at(hash).contains(&"meta.property-value.css"));
    }

    #[test]
    fn test_comments_and_strings_hide_selectors() {
        let source = "/* .hidden {} */ a[title=\".nope\"] { }";
        let (chars, map) = tag(source, Dialect::Css);
        assert!(texts(&chars, &map, "entity.other.attribute-name.class").is_empty());
        assert!(map.stack_at(4).contains(&"comment.block.css"));
    }

    #[test]
    fn test_pseudo_arguments_are_selectors() {
        let (chars, map) = tag("li:not(.first) {}", Dialect::Css);
        assert_eq!(texts(&chars, &map, "entity.other.attribute-name.class"), vec![".first"]);
    }

    #[test]
    fn test_less_variables_and_mixins() {
        let source = "@primary: #333;\n.border(@w; @c: red) { border: @w solid @c; }\n.box { .border(1px; blue); color: @primary; }";
        let (chars, map) = tag(source, Dialect::Less);
        assert_eq!(texts(&chars, &map, "variable.declaration.less"), vec!["@primary"]);
        assert_eq!(
            texts(&chars, &map, "entity.other.attribute-name.mixin.less"),
            vec![".border"]
        );
        assert_eq!(texts(&chars, &map, "entity.other.attribute-name.class"), vec![".box"]);

        let call = source.rfind(".border(").unwrap();
        assert!(map.stack_at(call + 1).contains(&"meta.mixin-call.less"));
        assert!(map.stack_at(call + 9).contains(&"parameter.less"));
    }

    #[test]
    fn test_less_line_comment() {
        let (chars, map) = tag("// .gone {}\n.kept {}", Dialect::Less);
        assert_eq!(texts(&chars, &map, "entity.other.attribute-name.class"), vec![".kept"]);
    }

    #[test]
    fn test_scss_variables_mixins_and_includes() {
        let source = "$gap: 4px;\n@mixin pad($x, $y: 1) { padding: $x $y; }\n.card { @include pad(1px, 2px); }";
        let (chars, map) = tag(source, Dialect::Scss);
        assert_eq!(texts(&chars, &map, "variable.declaration.scss"), vec!["$gap"]);
        assert_eq!(texts(&chars, &map, "entity.name.function.scss"), vec!["pad"]);

        let include = source.find("@include").unwrap();
        let selector = ScopeSelector::parse(
            "meta.property-list.scss meta.at-rule.include.scss - punctuation.section.function.scss",
        );
        assert!(selector.matches(&map.stack_at(include + 9)));
        let paren = source.rfind("(1px").unwrap();
        assert!(!selector.matches(&map.stack_at(paren + 1)));
    }

    #[test]
    fn test_scss_interpolation_is_not_a_block() {
        let (chars, map) = tag(".a-#{$n} { } .b { }", Dialect::Scss);
        assert_eq!(
            texts(&chars, &map, "entity.other.attribute-name.class"),
            vec![".a-", ".b"]
        );
    }

    #[test]
    fn test_unterminated_declaration_reaches_end() {
        let source = ".a { color:";
        let (_, map) = tag(source, Dialect::Css);
        let stack = map.stack_at(source.len());
        assert!(stack.contains(&"meta.property-list.css"));
        assert!(stack.contains(&"meta.property-value.css"));
    }

    #[test]
    fn test_nested_parent_reference_is_a_selector() {
        for dialect in [Dialect::Scss, Dialect::Less] {
            let source = ".a { &:ho";
            let (chars, map) = tag(source, dialect);
            let stack = map.stack_at(source.len());
            assert!(!stack.iter().any(|s| s.starts_with("meta.property-value")));
            assert_eq!(texts(&chars, &map, "entity.other.pseudo-class"), vec![":ho"]);
        }

        let (chars, map) = tag(".a { color: red; > .b:hover }", Dialect::Scss);
        assert_eq!(
            texts(&chars, &map, "entity.other.attribute-name.class"),
            vec![".a", ".b"]
        );
        assert_eq!(texts(&chars, &map, "support.type.property-name"), vec!["color"]);
    }

    #[test]
    fn test_top_level_text_is_a_selector() {
        let (chars, map) = tag("a { }\n.fo", Dialect::Css);
        assert_eq!(texts(&chars, &map, "entity.other.attribute-name.class"), vec![".fo"]);
    }
}
