use tree_sitter::{Node, Parser, Tree};

use super::css::tag_css;
use super::map::ScopeBuilder;

pub struct HtmlParser {
    parser: Parser,
}

impl HtmlParser {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_html::LANGUAGE.into())
            .expect("Failed to load HTML grammar");

        Self { parser }
    }

    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag markup scopes from the tree-sitter HTML tree.
///
/// `char_starts[i]` is the byte offset of character `i`; node byte ranges are
/// mapped back to character offsets through it.
pub fn tag_html(source: &str, chars: &[char], char_starts: &[usize], builder: &mut ScopeBuilder) {
    let mut parser = HtmlParser::new();
    let Some(tree) = parser.parse(source) else {
        tracing::debug!("tree-sitter returned no HTML tree");
        return;
    };
    let mut tagger = HtmlTagger {
        chars,
        char_starts,
        builder,
        strings: Vec::new(),
        opaque: Vec::new(),
    };
    tagger.visit(tree.root_node());
    tag_open_attribute_values(chars, &tagger.strings, &tagger.opaque, tagger.builder);
}

struct HtmlTagger<'a> {
    chars: &'a [char],
    char_starts: &'a [usize],
    builder: &'a mut ScopeBuilder,
    /// Attribute value ranges tagged from the tree
    strings: Vec<(usize, usize)>,
    /// Comments and raw text, in document order
    opaque: Vec<(usize, usize)>,
}

impl HtmlTagger<'_> {
    fn char_offset(&self, byte: usize) -> usize {
        match self.char_starts.binary_search(&byte) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }

    fn range(&self, node: &Node) -> (usize, usize) {
        (
            self.char_offset(node.start_byte()),
            self.char_offset(node.end_byte()),
        )
    }

    fn visit(&mut self, node: Node) {
        let (start, end) = self.range(&node);
        let scope = match node.kind() {
            "start_tag" | "end_tag" | "self_closing_tag" => Some("meta.tag.html"),
            "attribute" => Some("meta.attribute-with-value.html"),
            "attribute_name" => Some("entity.other.attribute-name.html"),
            "tag_name" => Some("entity.name.tag.html"),
            "quoted_attribute_value" => {
                if self.chars.get(start) == Some(&'\'') {
                    Some("string.quoted.single.html")
                } else {
                    Some("string.quoted.double.html")
                }
            }
            "attribute_value" if node.parent().is_some_and(|p| p.kind() == "attribute") => {
                Some("string.unquoted.html")
            }
            "comment" => Some("comment.block.html"),
            "raw_text" => {
                self.raw_text(&node, start, end);
                return;
            }
            _ => None,
        };

        match node.kind() {
            "quoted_attribute_value" | "attribute_value" if scope.is_some() => {
                self.strings.push((start, end))
            }
            "comment" => self.opaque.push((start, end)),
            _ => {}
        }
        if let Some(scope) = scope {
            self.builder.open(scope, start);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
        if scope.is_some() {
            self.builder.close(end);
        }
    }

    fn raw_text(&mut self, node: &Node, start: usize, end: usize) {
        self.opaque.push((start, end));
        match node.parent().map(|p| p.kind()) {
            Some("style_element") => {
                self.builder.open("source.css.embedded.html", start);
                tag_css(self.chars, start, end, self.builder);
                self.builder.close(end);
            }
            Some("script_element") => {
                self.builder.region("source.js.embedded.html", start, end);
            }
            _ => {}
        }
    }
}

/// Tag quoted attribute values the tree lost to error recovery.
///
/// While a value is being typed its closing quote is usually missing, and
/// tree-sitter folds the whole tag into an ERROR node. Inside tags, every
/// `=` followed by a quote not already covered by a tagged value opens a
/// string that runs to the next matching quote, or past the end of the
/// buffer when there is none.
fn tag_open_attribute_values(
    chars: &[char],
    strings: &[(usize, usize)],
    opaque: &[(usize, usize)],
    builder: &mut ScopeBuilder,
) {
    let covered = |point: usize| strings.iter().any(|&(s, e)| s <= point && point < e);
    let mut opaque = opaque.iter().peekable();
    let mut in_tag = false;
    let mut i = 0;

    while i < chars.len() {
        while opaque.next_if(|&&(_, end)| end <= i).is_some() {}
        if let Some(&&(start, end)) = opaque.peek() {
            if start <= i {
                i = end;
                in_tag = false;
                continue;
            }
        }

        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '<' if next.is_some_and(|n| n.is_ascii_alphabetic()) => in_tag = true,
            '>' => in_tag = false,
            '=' if in_tag => {
                let mut q = i + 1;
                while chars.get(q).is_some_and(|c| *c == ' ' || *c == '\t') {
                    q += 1;
                }
                let quote = match chars.get(q) {
                    Some(&quote) if quote == '"' || quote == '\'' => quote,
                    _ => {
                        i += 1;
                        continue;
                    }
                };
                let close = chars[q + 1..]
                    .iter()
                    .position(|c| *c == quote)
                    .map(|p| q + 1 + p);
                if !covered(q) {
                    let scope = if quote == '\'' {
                        "string.quoted.single.html"
                    } else {
                        "string.quoted.double.html"
                    };
                    let end = close.map_or(builder.unterminated_end(), |p| p + 1);
                    builder.region(scope, q, end);
                }
                match close {
                    Some(p) => {
                        i = p + 1;
                        continue;
                    }
                    None => return,
                }
            }
            _ => {}
        }
        i += 1;
    }
}
