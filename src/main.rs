#![allow(dead_code)]

mod cache;
mod classifier;
mod config;
mod context;
mod error;
mod extractor;
mod handler;
mod host;
mod loader;
mod model;
mod router;
mod scope;
mod server;
mod util;

use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(server::Backend::new);

    Server::new(stdin, stdout, socket).serve(service).await;
}
