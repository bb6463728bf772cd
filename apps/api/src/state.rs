use std::sync::Arc;
use std::time::Duration;

use crate::ingest::IngestService;
use crate::jobs::JobStore;
use crate::llm_client::prompts::PromptSet;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::ChatProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    /// Provider used for offer generation; ingestion holds its own handle.
    pub llm: Arc<dyn ChatProvider>,
    pub prompts: Arc<PromptSet>,
    pub ingest: Arc<IngestService>,
    pub retry: RetryPolicy,
    /// Upper bound on one pipeline-level LLM operation, retries included.
    pub call_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn JobStore>,
        llm: Arc<dyn ChatProvider>,
        prompts: Arc<PromptSet>,
        retry: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        let ingest = Arc::new(IngestService::new(
            store.clone(),
            llm.clone(),
            prompts.clone(),
            retry,
            call_timeout,
        ));
        Self {
            store,
            llm,
            prompts,
            ingest,
            retry,
            call_timeout,
        }
    }
}
