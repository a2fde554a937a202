use std::path::Path;

use phf::phf_map;

/// Language of a buffer, chosen from its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Css,
    Less,
    Scss,
    Html,
    Plain,
}

static DIALECT_BY_EXTENSION: phf::Map<&'static str, Dialect> = phf_map! {
    "css" => Dialect::Css,
    "less" => Dialect::Less,
    "scss" => Dialect::Scss,
    "html" => Dialect::Html,
    "htm" => Dialect::Html,
    "xhtml" => Dialect::Html,
    "shtml" => Dialect::Html,
};

impl Dialect {
    /// Resolve a dialect from an extension without the leading dot
    pub fn from_extension(extension: &str) -> Self {
        DIALECT_BY_EXTENSION
            .get(extension.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(Dialect::Plain)
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Dialect::Plain)
    }

    /// [`Dialect::from_path`], also treating `markup_extensions` (with the
    /// dot) as HTML
    pub fn detect(path: &Path, markup_extensions: &[String]) -> Self {
        match Self::from_path(path) {
            Dialect::Plain => {
                let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
                let is_markup = !extension.is_empty()
                    && markup_extensions.iter().any(|markup| {
                        markup
                            .strip_prefix('.')
                            .is_some_and(|m| m.eq_ignore_ascii_case(extension))
                    });
                if is_markup { Dialect::Html } else { Dialect::Plain }
            }
            dialect => dialect,
        }
    }

    pub fn is_stylesheet(&self) -> bool {
        matches!(self, Dialect::Css | Dialect::Less | Dialect::Scss)
    }

    /// Scope-name suffix used by the stylesheet tagger
    pub fn suffix(&self) -> &'static str {
        match self {
            Dialect::Css => "css",
            Dialect::Less => "less",
            Dialect::Scss => "scss",
            Dialect::Html => "html",
            Dialect::Plain => "plain",
        }
    }

    /// Outermost scope of every position in a buffer of this dialect
    pub fn base_scope(&self) -> &'static str {
        match self {
            Dialect::Css => "source.css",
            Dialect::Less => "source.less",
            Dialect::Scss => "source.scss",
            Dialect::Html => "text.html.basic",
            Dialect::Plain => "text.plain",
        }
    }
}
