use tower_lsp::lsp_types::notification::Progress;
use tower_lsp::lsp_types::request::WorkDoneProgressCreate;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;

/// Work-done progress of one ingestion run
pub struct IngestProgress<'a> {
    client: &'a Client,
    token: NumberOrString,
    total: usize,
}

impl<'a> IngestProgress<'a> {
    /// Create the token and announce the run
    pub async fn begin(client: &'a Client, run: u64, total: usize) -> IngestProgress<'a> {
        let token = NumberOrString::String(format!("css-extended-ingest-{}", run));
        let _ = client
            .send_request::<WorkDoneProgressCreate>(WorkDoneProgressCreateParams {
                token: token.clone(),
            })
            .await;

        let progress = Self {
            client,
            token,
            total,
        };
        progress
            .send(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                title: "CSS Extended".to_string(),
                cancellable: Some(false),
                message: Some(format!("Loading {} files", total)),
                percentage: Some(0),
            }))
            .await;
        progress
    }

    pub async fn report(&self, done: usize, message: String) {
        let percentage = (done * 100 / self.total.max(1)) as u32;
        self.send(WorkDoneProgress::Report(WorkDoneProgressReport {
            cancellable: Some(false),
            message: Some(message),
            percentage: Some(percentage),
        }))
        .await;
    }

    pub async fn end(self, cached: usize) {
        self.send(WorkDoneProgress::End(WorkDoneProgressEnd {
            message: Some(format!("Cached {} of {} files", cached, self.total)),
        }))
        .await;
    }

    async fn send(&self, value: WorkDoneProgress) {
        self.client
            .send_notification::<Progress>(ProgressParams {
                token: self.token.clone(),
                value: ProgressParamsValue::WorkDone(value),
            })
            .await;
    }
}
