use tree_sitter::{Node, Parser, Tree};

use crate::model::Dialect;

use super::map::ScopeBuilder;
use super::stylesheet::tag_stylesheet;

pub struct CssParser {
    parser: Parser,
}

impl CssParser {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_css::LANGUAGE.into())
            .expect("Failed to load CSS grammar");

        Self { parser }
    }

    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }
}

impl Default for CssParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag plain CSS in `chars[start..end]`.
///
/// A clean tree-sitter parse is tagged from the tree. Text with syntax errors,
/// which is what a buffer looks like while a selector or value is being
/// typed, goes through the lexical stylesheet tagger instead.
pub fn tag_css(chars: &[char], start: usize, end: usize, builder: &mut ScopeBuilder) {
    let end = end.min(chars.len());
    let source: String = chars[start..end].iter().collect();
    let tree = CssParser::new().parse(&source);
    let Some(tree) = tree.filter(|tree| !tree.root_node().has_error()) else {
        tag_stylesheet(chars, start, end, Dialect::Css, builder);
        return;
    };

    let char_starts: Vec<usize> = source.char_indices().map(|(b, _)| b).collect();
    let mut tagger = CssTagger {
        chars,
        base: start,
        char_starts: &char_starts,
        builder,
    };
    tagger.visit(tree.root_node());
}

struct CssTagger<'a> {
    chars: &'a [char],
    /// Character offset of the parsed text inside the buffer
    base: usize,
    char_starts: &'a [usize],
    builder: &'a mut ScopeBuilder,
}

impl CssTagger<'_> {
    fn char_offset(&self, byte: usize) -> usize {
        let idx = match self.char_starts.binary_search(&byte) {
            Ok(idx) => idx,
            Err(idx) => idx,
        };
        self.base + idx
    }

    fn range(&self, node: &Node) -> (usize, usize) {
        (
            self.char_offset(node.start_byte()),
            self.char_offset(node.end_byte()),
        )
    }

    /// `node` plus the punctuation right before it (`.`, `#`, `:`, `::`)
    fn with_sigil(&self, node: &Node) -> (usize, usize) {
        let (start, end) = self.range(node);
        match node.prev_sibling() {
            Some(prev) if !prev.is_named() => (self.range(&prev).0, end),
            _ => (start, end),
        }
    }

    fn visit(&mut self, node: Node) {
        let parent = node.parent().map(|p| p.kind());
        match (node.kind(), parent) {
            ("class_name", Some("class_selector")) => {
                let (start, end) = self.with_sigil(&node);
                self.builder.token("entity.other.attribute-name.class.css", start, end);
                return;
            }
            ("id_name", Some("id_selector")) => {
                let (start, end) = self.with_sigil(&node);
                self.builder.token("entity.other.attribute-name.id.css", start, end);
                return;
            }
            ("class_name", Some("pseudo_class_selector")) => {
                let (start, end) = self.with_sigil(&node);
                self.builder.token("entity.other.pseudo-class.css", start, end);
                return;
            }
            ("tag_name", Some("pseudo_element_selector"))
                if node.prev_sibling().is_some_and(|prev| prev.kind() == "::") =>
            {
                let (start, end) = self.with_sigil(&node);
                self.builder.token("entity.other.pseudo-element.css", start, end);
                return;
            }
            ("comment", _) => {
                let (start, end) = self.range(&node);
                self.builder.token("comment.block.css", start, end);
                return;
            }
            ("string_value", _) => {
                let (start, end) = self.range(&node);
                let scope = if self.chars.get(start) == Some(&'\'') {
                    "string.quoted.single.css"
                } else {
                    "string.quoted.double.css"
                };
                self.builder.token(scope, start, end);
                return;
            }
            ("property_name", _) => {
                let (start, end) = self.range(&node);
                self.builder.token("support.type.property-name.css", start, end);
                return;
            }
            ("at_keyword", _) => {
                let (start, end) = self.range(&node);
                self.builder.token("keyword.control.at-rule.css", start, end);
                return;
            }
            (kind, _) if !node.is_named() && kind.starts_with('@') => {
                let (start, end) = self.range(&node);
                self.builder.token("keyword.control.at-rule.css", start, end);
                return;
            }
            ("block", _) => {
                let (start, end) = self.range(&node);
                self.builder.open("meta.property-list.css", start);
                self.children(node);
                self.builder.close(end);
                return;
            }
            ("declaration", _) => {
                self.declaration(node);
                return;
            }
            _ => {}
        }
        self.children(node);
    }

    fn children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    fn declaration(&mut self, node: Node) {
        let (_, end) = self.range(&node);
        let mut value_start = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match value_start {
                None if child.kind() == ":" => {
                    let start = self.range(&child).1;
                    self.builder.open("meta.property-value.css", start);
                    value_start = Some(start);
                }
                _ => self.visit(child),
            }
        }
        if value_start.is_some() {
            self.builder.close(end);
        }
    }
}
