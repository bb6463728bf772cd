use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::handlers::draft_with_timeout;
use crate::generation::offer::{CvInput, OfferDraft};
use crate::jobs::JobFilter;
use crate::models::job::JobPosting;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsQuery {
    pub search: Option<String>,
    pub remote: Option<bool>,
    pub grade: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListJobsQuery {
    fn into_filter(self) -> JobFilter {
        let non_blank = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        JobFilter {
            search: non_blank(self.search),
            remote: self.remote,
            grade: non_blank(self.grade),
            limit: per_page,
            offset: (page - 1) * per_page,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JobOfferRequest {
    pub cv: CvInput,
}

async fn load_job(state: &AppState, id: Uuid) -> Result<JobPosting, AppError> {
    state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// GET /api/v1/jobs?search=&remote=&grade=&page=&perPage=
///
/// Newest first.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let jobs = state.store.list(&query.into_filter()).await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    Ok(Json(load_job(&state, id).await?))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.delete(id).await? {
        tracing::info!(job_id = %id, "job deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Job {id} not found")))
    }
}

/// POST /api/v1/jobs/:id/reprocess
///
/// Re-extracts fields from the stored original text, e.g. after a prompt change.
pub async fn handle_reprocess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    Ok(Json(state.ingest.reprocess(id).await?))
}

/// POST /api/v1/jobs/:id/offer
///
/// The stored original text is the job description.
pub async fn handle_job_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<JobOfferRequest>,
) -> Result<Json<OfferDraft>, AppError> {
    let job = load_job(&state, id).await?;
    if !job.is_vacancy {
        return Err(AppError::Validation(format!("Job {id} is not a vacancy")));
    }
    let draft = draft_with_timeout(&state, &request.cv, &job.original_text).await?;
    Ok(Json(draft))
}
