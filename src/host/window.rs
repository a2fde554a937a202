use std::sync::Arc;

use super::{Document, View, Window};

/// Snapshot of the open workspace: project descriptor, folders and documents
#[derive(Debug, Clone, Default)]
pub struct WindowState {
    project_file: Option<String>,
    folders: Vec<String>,
    documents: Vec<Arc<Document>>,
}

impl WindowState {
    pub fn new(project_file: Option<String>, folders: Vec<String>, documents: Vec<Arc<Document>>) -> Self {
        Self {
            project_file,
            folders,
            documents,
        }
    }

    pub fn with_documents(mut self, documents: Vec<Arc<Document>>) -> Self {
        self.documents = documents;
        self
    }
}

impl Window for WindowState {
    fn project_file_name(&self) -> Option<&str> {
        self.project_file.as_deref()
    }

    fn folders(&self) -> Vec<&str> {
        self.folders.iter().map(String::as_str).collect()
    }

    fn views(&self) -> Vec<&dyn View> {
        self.documents.iter().map(|doc| doc.as_ref() as &dyn View).collect()
    }
}
