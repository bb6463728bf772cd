//! Ingestion: dedup check → extraction → persist, once per unique source message.
//!
//! The dedup check happens under the message's key locks and before any
//! provider call, so a duplicate never costs an LLM request.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extraction::analyzer::{analyze_vacancy, Extraction, ExtractionError};
use crate::ingest::dedup::{DedupKey, DedupKeys, KeyLocks, SourceRef};
use crate::jobs::{JobStore, StoreError};
use crate::llm_client::prompts::PromptSet;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::ChatProvider;
use crate::models::job::{JobPosting, NewJobPosting};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),
}

/// One raw message as it arrives from a channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub text: String,
    #[serde(flatten)]
    pub source: SourceRef,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum IngestOutcome {
    Created {
        job: Box<JobPosting>,
    },
    /// Already known. Not an error: nothing was created and no provider call was made.
    #[serde(rename_all = "camelCase")]
    Duplicate { existing_id: Uuid, key: DedupKey },
}

pub struct IngestService {
    store: Arc<dyn JobStore>,
    provider: Arc<dyn ChatProvider>,
    prompts: Arc<PromptSet>,
    retry: RetryPolicy,
    call_timeout: Duration,
    locks: KeyLocks,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn JobStore>,
        provider: Arc<dyn ChatProvider>,
        prompts: Arc<PromptSet>,
        retry: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            provider,
            prompts,
            retry,
            call_timeout,
            locks: KeyLocks::new(),
        }
    }

    pub async fn ingest(&self, message: IncomingMessage) -> Result<IngestOutcome, IngestError> {
        if message.text.trim().is_empty() {
            return Err(IngestError::InvalidInput(
                "message text must not be empty".to_string(),
            ));
        }

        let source = message.source.normalized();
        let keys = DedupKeys::derive(&source, &message.text);
        let _guard = self.locks.acquire(&keys).await;

        if let Some((existing_id, key)) = self.find_existing(&keys).await? {
            info!(%key, %existing_id, "duplicate source message, skipping");
            return Ok(IngestOutcome::Duplicate { existing_id, key });
        }

        let extraction = self.extract(&message.text).await?;
        let raw = extraction.raw_json();
        let new_job = NewJobPosting {
            channel_id: source.channel_id,
            message_id: source.message_id,
            hash: Some(keys.hash().to_string()),
            fields: extraction.fields,
            url: message.url,
            original_text: message.text,
            raw,
        };

        match self.store.create(new_job).await {
            Ok(job) => {
                info!(
                    job_id = %job.id,
                    is_vacancy = job.is_vacancy,
                    title = %job.title,
                    "message ingested"
                );
                Ok(IngestOutcome::Created { job: Box::new(job) })
            }
            // Another writer got there first (e.g. a second instance).
            Err(StoreError::Conflict(constraint)) => {
                warn!(%constraint, "dedup key taken during extraction");
                match self.find_existing(&keys).await? {
                    Some((existing_id, key)) => Ok(IngestOutcome::Duplicate { existing_id, key }),
                    None => Err(StoreError::Conflict(constraint).into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Re-runs extraction on a stored record's original text and updates it in place.
    ///
    /// Holds the record's dedup-key locks for the whole re-extract-then-update
    /// sequence, so it never interleaves with another reprocess or an ingest of
    /// the same message.
    pub async fn reprocess(&self, id: Uuid) -> Result<JobPosting, IngestError> {
        let job = self.load(id).await?;
        let source = SourceRef {
            channel_id: job.channel_id.clone(),
            message_id: job.message_id,
        };
        let keys = DedupKeys::derive(&source, &job.original_text);
        let _guard = self.locks.acquire(&keys).await;

        // Re-read under the lock: the record may have changed or gone meanwhile.
        let mut job = self.load(id).await?;
        let extraction = self.extract(&job.original_text).await?;
        job.raw = extraction.raw_json();
        job.apply(extraction.fields);

        let job = self.store.update(&job).await?;
        info!(job_id = %job.id, is_vacancy = job.is_vacancy, "job reprocessed");
        Ok(job)
    }

    async fn load(&self, id: Uuid) -> Result<JobPosting, StoreError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn find_existing(
        &self,
        keys: &DedupKeys,
    ) -> Result<Option<(Uuid, DedupKey)>, StoreError> {
        for key in keys.in_lookup_order() {
            let found = match key {
                DedupKey::Source {
                    channel_id,
                    message_id,
                } => self.store.find_by_source(channel_id, *message_id).await?,
                DedupKey::Content { hash } => self.store.find_by_hash(hash).await?,
            };
            if let Some(job) = found {
                return Ok(Some((job.id, key.clone())));
            }
        }
        Ok(None)
    }

    async fn extract(&self, text: &str) -> Result<Extraction, IngestError> {
        let call = analyze_vacancy(
            self.provider.as_ref(),
            &self.prompts.vacancy_parser,
            self.retry,
            text,
        );
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(timeout = ?self.call_timeout, "extraction cancelled");
                Err(IngestError::Timeout(self.call_timeout))
            }
        }
    }
}
