mod progress;
pub mod workspace;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::cache::CacheStore;
use crate::config::{list_directory, Settings};
use crate::context::AppContext;
use crate::handler::CompletionHandler;
use crate::host::Document;
use crate::loader::{IngestionPlan, IngestionWorker, TaskOutcome};
use crate::router::CompletionRouter;

use progress::IngestProgress;
use workspace::{document_from_uri, WorkspaceState};

pub const DELETE_CACHE_COMMAND: &str = "cssExtended.deleteCache";
pub const ADD_TO_CACHE_COMMAND: &str = "cssExtended.addToCache";

/// Directories passed to `addToCache` start this far apart
const DIRECTORY_STAGGER: Duration = Duration::from_millis(100);

/// Arguments of `cssExtended.addToCache`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AddToCacheArgs {
    pub paths: Vec<String>,
    pub name: String,
    pub file_type: String,
}

impl Default for AddToCacheArgs {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            name: String::new(),
            file_type: "*.*".to_string(),
        }
    }
}

pub struct Backend {
    client: Client,
    context: Arc<RwLock<AppContext>>,
    documents: Arc<DashMap<Url, Arc<Document>>>,
    workspace: Arc<RwLock<WorkspaceState>>,
    init_options: RwLock<Option<serde_json::Value>>,
    ingest_runs: AtomicU64,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            context: Arc::new(RwLock::new(AppContext::default())),
            documents: Arc::new(DashMap::new()),
            workspace: Arc::new(RwLock::new(WorkspaceState::default())),
            init_options: RwLock::new(None),
            ingest_runs: AtomicU64::new(0),
        }
    }

    async fn on_change(&self, uri: Url, text: &str) -> Arc<Document> {
        let markup = self.context.read().await.settings.markup_extension.clone();
        let document = Arc::new(document_from_uri(&uri, text, &markup));
        self.documents.insert(uri, Arc::clone(&document));
        document
    }

    async fn load_settings(&self) -> Settings {
        let root = self.workspace.read().await.root.clone();
        let settings = match &root {
            Some(root) => Settings::load_from_dir(root),
            None => Settings::default(),
        };
        match &*self.init_options.read().await {
            Some(options) => settings.merge_json(options),
            None => settings,
        }
    }

    /// Spawn a task that runs `plan` on its own schedule
    fn schedule_ingestion(&self, plan: IngestionPlan) {
        if plan.is_empty() {
            return;
        }
        let run = self.ingest_runs.fetch_add(1, Ordering::Relaxed);
        let client = self.client.clone();
        let context = Arc::clone(&self.context);
        let documents = Arc::clone(&self.documents);
        let workspace = Arc::clone(&self.workspace);

        tokio::spawn(async move {
            let total = plan.len();
            let progress = IngestProgress::begin(&client, run, total).await;

            let start = Instant::now();
            let mut worker = IngestionWorker::new(&plan);
            let mut cached = 0usize;
            for task in plan.tasks() {
                tokio::time::sleep_until(start + task.delay).await;
                let window = workspace.read().await.window(&documents);
                let outcome = {
                    let mut context = context.write().await;
                    worker.run_task(task, &mut context, &window)
                };
                if matches!(outcome, TaskOutcome::Cached(_)) {
                    cached += 1;
                }
                progress.report(task.index + 1, task.progress_message(total)).await;
            }

            tracing::info!(
                "Ingested {} of {} files ({} syntax loads)",
                cached,
                total,
                worker.syntax_loads()
            );
            progress.end(cached).await;
        });
    }

    async fn add_to_cache(&self, args: AddToCacheArgs) {
        let interval = Duration::from_millis(self.context.read().await.settings.ingest_interval_ms);
        let mut offset = DIRECTORY_STAGGER;

        for path in &args.paths {
            let dir = PathBuf::from(path);
            if !dir.is_dir() {
                tracing::debug!("addToCache: {} is not a directory", path);
                continue;
            }
            match list_directory(&dir, &args.file_type) {
                Ok(files) => {
                    let plan = IngestionPlan::new(files, interval, false).with_offset(offset);
                    self.client
                        .log_message(
                            MessageType::INFO,
                            format!("Adding {} files from {} to cache", plan.len(), path),
                        )
                        .await;
                    self.schedule_ingestion(plan);
                }
                Err(e) => {
                    self.client
                        .log_message(MessageType::ERROR, format!("addToCache: {}", e))
                        .await;
                }
            }
            offset += DIRECTORY_STAGGER;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        *self.workspace.write().await = WorkspaceState::from_params(&params);
        *self.init_options.write().await = params.initialization_options.clone();

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "css-extended-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..Default::default()
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(
                        [".", "#", ":", "@", "$", "\"", " "]
                            .iter()
                            .map(|c| c.to_string())
                            .collect(),
                    ),
                    ..Default::default()
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        DELETE_CACHE_COMMAND.to_string(),
                        ADD_TO_CACHE_COMMAND.to_string(),
                    ],
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "CSS Extended Language Server initialized")
            .await;

        let settings = self.load_settings().await;
        let (cache_dir, external) = {
            let mut workspace = self.workspace.write().await;
            if settings.project_file.is_some() {
                workspace.project_file = settings.project_file.clone();
            }
            (workspace.cache_dir(&settings), workspace.external_files(&settings))
        };

        let store = match &cache_dir {
            Some(dir) => {
                self.client
                    .log_message(MessageType::INFO, format!("Cache directory: {:?}", dir))
                    .await;
                CacheStore::open(dir)
            }
            None => CacheStore::in_memory(),
        };

        let external = match external {
            Ok(files) => files,
            Err(e) => {
                self.client
                    .log_message(MessageType::ERROR, format!("Invalid load_external_files: {}", e))
                    .await;
                Vec::new()
            }
        };
        if !external.is_empty() {
            self.client
                .log_message(
                    MessageType::INFO,
                    format!("Loading {} external files", external.len()),
                )
                .await;
        }

        let interval = Duration::from_millis(settings.ingest_interval_ms);
        let external_names = external
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect();
        *self.context.write().await =
            AppContext::new(settings, store).with_external_files(external_names);

        self.schedule_ingestion(IngestionPlan::new(external, interval, true));
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        match params.command.as_str() {
            DELETE_CACHE_COMMAND => {
                self.context.write().await.remove_cache();
                self.client
                    .log_message(MessageType::INFO, "CSS Extended cache deleted")
                    .await;
                Ok(Some(serde_json::json!({ "success": true })))
            }
            ADD_TO_CACHE_COMMAND => {
                let args = params
                    .arguments
                    .into_iter()
                    .next()
                    .map(serde_json::from_value::<AddToCacheArgs>)
                    .transpose();
                match args {
                    Ok(args) => {
                        let args = args.unwrap_or_default();
                        tracing::debug!("addToCache {:?}", args);
                        self.add_to_cache(args).await;
                        Ok(Some(serde_json::json!({ "success": true })))
                    }
                    Err(e) => {
                        self.client
                            .log_message(
                                MessageType::ERROR,
                                format!("Invalid addToCache arguments: {}", e),
                            )
                            .await;
                        Ok(Some(serde_json::json!({ "success": false })))
                    }
                }
            }
            _ => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Unknown command: {}", params.command),
                    )
                    .await;
                Ok(None)
            }
        }
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let text = params.text_document.text;
        self.on_change(params.text_document.uri, &text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.on_change(params.text_document.uri, &change.text).await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let document = match params.text {
            Some(text) => self.on_change(uri, &text).await,
            None => match self.documents.get(&uri) {
                Some(entry) => Arc::clone(entry.value()),
                None => return,
            },
        };

        let window = self.workspace.read().await.window(&self.documents);
        self.context.write().await.save_cache(document.as_ref(), &window);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(document) = self.documents.get(&uri).map(|entry| Arc::clone(entry.value())) else {
            return Ok(None);
        };
        let offset = document.offset_at(position.line, position.character);
        let window = self.workspace.read().await.window(&self.documents);

        let context = self.context.read().await;
        let outcome = CompletionRouter::new(&context).route(document.as_ref(), &window, &[offset]);
        Ok(outcome.map(CompletionHandler::to_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_to_cache_args_defaults() {
        let args: AddToCacheArgs =
            serde_json::from_value(serde_json::json!({ "paths": ["/work/less"] })).unwrap();
        assert_eq!(args.paths, vec!["/work/less".to_string()]);
        assert_eq!(args.file_type, "*.*");
        assert!(args.name.is_empty());
    }
}
