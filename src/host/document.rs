use std::path::Path;

use crate::model::{Dialect, Span};
use crate::scope::{tag_css, tag_html, tag_stylesheet, ScopeBuilder, ScopeMap, ScopeSelector};

use super::View;

/// In-memory buffer with its scope tags, built once per text revision
#[derive(Debug, Clone)]
pub struct Document {
    file_name: Option<String>,
    name: String,
    scratch: bool,
    dialect: Dialect,
    chars: Vec<char>,
    scopes: ScopeMap,
}

impl Document {
    pub fn new(file_name: Option<String>, name: String, dialect: Dialect, text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut builder = ScopeBuilder::new(dialect.base_scope(), chars.len());
        match dialect {
            Dialect::Css => tag_css(&chars, 0, chars.len(), &mut builder),
            Dialect::Less | Dialect::Scss => {
                tag_stylesheet(&chars, 0, chars.len(), dialect, &mut builder);
            }
            Dialect::Html => {
                let char_starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
                tag_html(text, &chars, &char_starts, &mut builder);
            }
            Dialect::Plain => {}
        }

        Self {
            file_name,
            name,
            scratch: false,
            dialect,
            chars,
            scopes: builder.finish(),
        }
    }

    /// Buffer backed by a file on disk
    pub fn from_path(path: &Path, text: &str) -> Self {
        Self::from_path_as(path, text, Dialect::from_path(path))
    }

    /// Buffer backed by a file on disk, tagged as `dialect`
    pub fn from_path_as(path: &Path, text: &str, dialect: Dialect) -> Self {
        let file_name = path.to_string_lossy().to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.clone());
        Self::new(Some(file_name), name, dialect, text)
    }

    /// Off-screen buffer named after the file it holds
    pub fn scratch(name: String, dialect: Dialect, text: &str, as_scratch: bool) -> Self {
        let mut doc = Self::new(None, name, dialect, text);
        doc.scratch = as_scratch;
        doc
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Character offset of an LSP position (UTF-16 columns), clamped to the buffer
    pub fn offset_at(&self, line: u32, character: u32) -> usize {
        let mut offset = 0;
        let mut current_line = 0;
        while current_line < line {
            match self.chars[offset..].iter().position(|c| *c == '\n') {
                Some(newline) => offset += newline + 1,
                None => return self.chars.len(),
            }
            current_line += 1;
        }

        let mut units = 0u32;
        while offset < self.chars.len() && self.chars[offset] != '\n' && units < character {
            units += self.chars[offset].len_utf16() as u32;
            offset += 1;
        }
        offset
    }
}

impl View for Document {
    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_scratch(&self) -> bool {
        self.scratch
    }

    fn size(&self) -> usize {
        self.chars.len()
    }

    fn char_at(&self, point: usize) -> Option<char> {
        self.chars.get(point).copied()
    }

    fn substr(&self, span: Span) -> String {
        let end = span.end.min(self.chars.len());
        let start = span.start.min(end);
        self.chars[start..end].iter().collect()
    }

    fn scope_stack(&self, point: usize) -> Vec<&str> {
        self.scopes.stack_at(point)
    }

    fn find_by_selector(&self, selector: &ScopeSelector) -> Vec<Span> {
        self.scopes.find_by_selector(selector)
    }
}
