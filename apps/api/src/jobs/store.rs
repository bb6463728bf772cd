use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::job::{JobPosting, NewJobPosting};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A record already holds this dedup key.
    #[error("Duplicate dedup key: {0}")]
    Conflict(String),

    #[error("Job not found: {0}")]
    NotFound(Uuid),
}

/// Listing criteria. Every set field narrows the result; text matches are
/// case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    /// Matched against title, company and description.
    pub search: Option<String>,
    pub remote: Option<bool>,
    pub grade: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl JobFilter {
    /// Does `job` pass the search, remote and grade criteria (paging aside)?
    pub fn matches(&self, job: &JobPosting) -> bool {
        let contains = |field: &str, needle: &str| {
            field.to_lowercase().contains(&needle.to_lowercase())
        };

        if let Some(search) = &self.search {
            if !(contains(&job.title, search)
                || contains(&job.company, search)
                || contains(&job.description, search))
            {
                return false;
            }
        }
        if let Some(remote) = self.remote {
            if job.is_remote != remote {
                return false;
            }
        }
        if let Some(grade) = &self.grade {
            if !contains(&job.grade, grade) {
                return false;
            }
        }
        true
    }
}

/// Create/update/find/list/delete over the jobs collection.
///
/// Implementations must reject a second record for the same
/// `(channel_id, message_id)` pair or the same `hash` with `StoreError::Conflict`.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: NewJobPosting) -> Result<JobPosting, StoreError>;

    /// Persists every mutable field of `job`; bumps `updated`.
    async fn update(&self, job: &JobPosting) -> Result<JobPosting, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError>;

    async fn find_by_source(
        &self,
        channel_id: &str,
        message_id: i64,
    ) -> Result<Option<JobPosting>, StoreError>;

    async fn find_by_hash(&self, hash: &str) -> Result<Option<JobPosting>, StoreError>;

    /// Postings matching `filter`, newest first.
    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobPosting>, StoreError>;

    /// Returns false when there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
