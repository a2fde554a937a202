//! Batch ingestion of stylesheets that are not open in the editor.
//!
//! Files are ordered by extension so the scratch buffer switches dialect as
//! rarely as possible, then run one by one with a fixed spacing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::CacheKeys;
use crate::context::AppContext;
use crate::host::{Document, Window};
use crate::model::Dialect;
use crate::util::extension_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionTask {
    pub path: PathBuf,
    /// Position in the plan, zero based
    pub index: usize,
    /// Delay from the moment the plan starts
    pub delay: Duration,
}

impl IngestionTask {
    pub fn progress_message(&self, total: usize) -> String {
        format!("parsing file {} of {}", self.index + 1, total)
    }
}

#[derive(Debug, Clone)]
pub struct IngestionPlan {
    tasks: Vec<IngestionTask>,
    as_scratch: bool,
}

impl IngestionPlan {
    /// Keep existing files, sort them by extension (stable) and space them
    /// `spacing` apart.
    pub fn new(files: Vec<PathBuf>, spacing: Duration, as_scratch: bool) -> Self {
        let mut files: Vec<PathBuf> = files.into_iter().filter(|path| path.is_file()).collect();
        files.sort_by_key(|path| extension_of(path));

        let tasks = files
            .into_iter()
            .enumerate()
            .map(|(index, path)| IngestionTask {
                path,
                index,
                delay: spacing * index as u32,
            })
            .collect();
        Self { tasks, as_scratch }
    }

    /// Shift every task by `offset`
    pub fn with_offset(mut self, offset: Duration) -> Self {
        for task in &mut self.tasks {
            task.delay += offset;
        }
        self
    }

    pub fn tasks(&self) -> &[IngestionTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn as_scratch(&self) -> bool {
        self.as_scratch
    }
}

/// Off-screen buffer reused across tasks; switching its dialect counts as
/// one syntax load.
#[derive(Debug)]
pub struct ScratchBuffer {
    dialect: Option<Dialect>,
    syntax_loads: usize,
    as_scratch: bool,
}

impl ScratchBuffer {
    pub fn new(as_scratch: bool) -> Self {
        Self {
            dialect: None,
            syntax_loads: 0,
            as_scratch,
        }
    }

    pub fn set_dialect(&mut self, dialect: Dialect) {
        if self.dialect != Some(dialect) {
            self.dialect = Some(dialect);
            self.syntax_loads += 1;
        }
    }

    pub fn syntax_loads(&self) -> usize {
        self.syntax_loads
    }

    /// Replace the buffer content, named after the file it came from
    pub fn fill(&self, name: &str, content: &str) -> Document {
        let dialect = self.dialect.unwrap_or(Dialect::Plain);
        Document::scratch(name.to_string(), dialect, &normalize_content(content), self.as_scratch)
    }
}

/// `)}` confuses closing-brace detection in some LESS files
pub fn normalize_content(content: &str) -> String {
    content.replace(")}", ") }")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Cached(CacheKeys),
    Unsupported,
    Unreadable,
}

pub struct IngestionWorker {
    buffer: ScratchBuffer,
    total: usize,
}

impl IngestionWorker {
    pub fn new(plan: &IngestionPlan) -> Self {
        Self {
            buffer: ScratchBuffer::new(plan.as_scratch()),
            total: plan.len(),
        }
    }

    pub fn syntax_loads(&self) -> usize {
        self.buffer.syntax_loads()
    }

    /// Read, tag and cache one file
    pub fn run_task(
        &mut self,
        task: &IngestionTask,
        context: &mut AppContext,
        window: &dyn Window,
    ) -> TaskOutcome {
        let dialect = Dialect::from_path(&task.path);
        if !dialect.is_stylesheet() {
            debug!("Skipping unsupported file {:?}", task.path);
            return TaskOutcome::Unsupported;
        }
        self.buffer.set_dialect(dialect);
        info!("{}: {}", task.progress_message(self.total), task.path.display());

        // Invalid UTF-8 sequences become U+FFFD
        let content = match fs::read(&task.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                debug!("Failed to read {:?}: {}", task.path, e);
                return TaskOutcome::Unreadable;
            }
        };

        let document = self.buffer.fill(&path_name(&task.path), &content);
        TaskOutcome::Cached(context.save_cache(&document, window))
    }

    /// Run every task immediately, ignoring delays
    pub fn run_all(
        &mut self,
        plan: &IngestionPlan,
        context: &mut AppContext,
        window: &dyn Window,
    ) -> Vec<TaskOutcome> {
        plan.tasks()
            .iter()
            .map(|task| self.run_task(task, context, window))
            .collect()
    }
}

fn path_name(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
