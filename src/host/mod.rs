//! Editor surface consumed by the extractor, cache store and router.

pub mod document;
pub mod window;

use std::path::Path;

use crate::model::Span;
use crate::scope::ScopeSelector;

pub use document::Document;
pub use window::WindowState;

/// One editing buffer
pub trait View {
    /// Absolute path when the buffer is backed by a file
    fn file_name(&self) -> Option<&str>;

    /// Logical name; scratch buffers use it to carry their source path
    fn name(&self) -> &str;

    fn is_scratch(&self) -> bool;

    /// Length in characters
    fn size(&self) -> usize;

    fn char_at(&self, point: usize) -> Option<char>;

    fn substr(&self, span: Span) -> String;

    /// Scope stack at `point`, outermost first
    fn scope_stack(&self, point: usize) -> Vec<&str>;

    /// Token regions whose scope matches `selector`
    fn find_by_selector(&self, selector: &ScopeSelector) -> Vec<Span>;

    fn match_selector(&self, point: usize, selector: &ScopeSelector) -> bool {
        selector.matches(&self.scope_stack(point))
    }

    fn score_selector(&self, point: usize, selector: &ScopeSelector) -> u32 {
        selector.score(&self.scope_stack(point))
    }

    /// File path, or the logical name for unsaved and scratch buffers
    fn key_name(&self) -> &str {
        self.file_name().unwrap_or_else(|| self.name())
    }

    /// Base name of [`View::key_name`], used as provenance in labels
    fn base_name(&self) -> String {
        let key = self.key_name();
        Path::new(key)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(key)
            .to_string()
    }

    /// Extension of [`View::key_name`] including the leading dot
    fn extension(&self) -> Option<String> {
        Path::new(self.key_name())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
    }
}

/// The set of buffers and folders the user is working in
pub trait Window {
    /// Path of an explicit project descriptor, if one is open
    fn project_file_name(&self) -> Option<&str>;

    /// Top-level folders, in the order they were opened
    fn folders(&self) -> Vec<&str>;

    fn views(&self) -> Vec<&dyn View>;
}
