use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::error::ConfigError;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

fn compile(pattern: &str) -> Result<GlobMatcher, ConfigError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ConfigError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Expands `load_external_files` patterns into existing files.
///
/// Each pattern is split into a literal base directory and a glob tail; the
/// base is walked as deep as the tail has components (unbounded with `**`).
#[derive(Debug, Clone)]
pub struct GlobExpander {
    patterns: Vec<PatternWalk>,
}

#[derive(Debug, Clone)]
struct PatternWalk {
    base: PathBuf,
    /// None when the tail contains `**`
    depth: Option<usize>,
    matcher: Option<GlobMatcher>,
    relative: bool,
}

impl GlobExpander {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| PatternWalk::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Matching files, sorted and without duplicates
    pub fn expand(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for pattern in &self.patterns {
            pattern.collect(&mut files);
        }
        files.sort();
        files.dedup();
        files
    }
}

impl PatternWalk {
    fn new(pattern: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = pattern.split('/').collect();
        let relative = !pattern.starts_with('/');
        let Some(first_glob) = parts.iter().position(|p| p.contains(GLOB_META)) else {
            return Ok(Self {
                base: PathBuf::from(pattern),
                depth: Some(0),
                matcher: None,
                relative,
            });
        };

        let literal = parts[..first_glob].join("/");
        let base = if !literal.is_empty() {
            PathBuf::from(literal)
        } else if relative {
            PathBuf::from(".")
        } else {
            PathBuf::from("/")
        };
        let tail = &parts[first_glob..];
        let depth = if tail.contains(&"**") {
            None
        } else {
            Some(tail.len())
        };

        Ok(Self {
            base,
            depth,
            matcher: Some(compile(pattern)?),
            relative,
        })
    }

    fn collect(&self, files: &mut Vec<PathBuf>) {
        match &self.matcher {
            None => {
                if self.base.is_file() {
                    files.push(self.base.clone());
                }
            }
            Some(matcher) => self.walk(&self.base, self.depth, matcher, files),
        }
    }

    fn walk(&self, dir: &Path, depth: Option<usize>, matcher: &GlobMatcher, files: &mut Vec<PathBuf>) {
        if depth == Some(0) {
            return;
        }
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, depth.map(|d| d - 1), matcher, files);
                continue;
            }
            let candidate = if self.relative {
                path.strip_prefix(".").unwrap_or(&path)
            } else {
                &path
            };
            if matcher.is_match(candidate) {
                files.push(candidate.to_path_buf());
            }
        }
    }
}

/// Files directly inside `dir` whose name matches `file_type` (e.g. `*.less`)
pub fn list_directory(dir: &Path, file_type: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let matcher = compile(file_type)?;
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.file_name().is_some_and(|name| matcher.is_match(name)))
            .collect(),
        Err(e) => {
            tracing::debug!("Cannot list {}: {}", dir.display(), e);
            Vec::new()
        }
    };
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn pattern(root: &Path, tail: &str) -> String {
        format!("{}/{}", root.display(), tail)
    }

    #[test]
    fn test_single_level_glob() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.css");
        touch(dir.path(), "b.less");
        touch(dir.path(), "nested/c.css");

        let expander = GlobExpander::new(&[pattern(dir.path(), "*.css")]).unwrap();
        assert_eq!(expander.expand(), vec![dir.path().join("a.css")]);
    }

    #[test]
    fn test_recursive_glob() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.css");
        touch(dir.path(), "nested/deep/c.css");
        touch(dir.path(), "nested/d.scss");

        let expander = GlobExpander::new(&[pattern(dir.path(), "**/*.css")]).unwrap();
        assert_eq!(
            expander.expand(),
            vec![dir.path().join("a.css"), dir.path().join("nested/deep/c.css")]
        );
    }

    #[test]
    fn test_literal_path_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "lib/base.less");

        let literal = pattern(dir.path(), "lib/base.less");
        let glob = pattern(dir.path(), "lib/*.less");
        let missing = pattern(dir.path(), "lib/missing.less");
        let expander = GlobExpander::new(&[literal, glob, missing]).unwrap();
        assert_eq!(expander.expand(), vec![dir.path().join("lib/base.less")]);
    }

    #[test]
    fn test_invalid_glob() {
        let result = GlobExpander::new(&["/tmp/[".to_string()]);
        assert!(matches!(result, Err(ConfigError::InvalidGlob { .. })));
    }

    #[test]
    fn test_list_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.less");
        touch(dir.path(), "a.less");
        touch(dir.path(), "c.css");
        touch(dir.path(), "sub/d.less");

        let files = list_directory(dir.path(), "*.less").unwrap();
        assert_eq!(files, vec![dir.path().join("a.less"), dir.path().join("b.less")]);
        assert_eq!(list_directory(dir.path(), "*.*").unwrap().len(), 3);
    }
}
