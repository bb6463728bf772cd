//! Axum route handlers for the Offers API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::generation::offer::{draft_offer, CvInput, OfferDraft};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    pub cv: CvInput,
    pub job_description: String,
}

/// Drafts an offer under the state's call timeout. Shared with the per-job endpoint.
pub async fn draft_with_timeout(
    state: &AppState,
    cv: &CvInput,
    job_description: &str,
) -> Result<OfferDraft, AppError> {
    if cv.is_blank() {
        return Err(AppError::Validation("cv cannot be empty".to_string()));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }

    let call = draft_offer(
        state.llm.as_ref(),
        &state.prompts.offer_message,
        state.retry,
        cv,
        job_description,
    );
    match tokio::time::timeout(state.call_timeout, call).await {
        Ok(draft) => Ok(draft?),
        Err(_) => Err(AppError::Timeout(format!(
            "offer generation did not finish within {:?}",
            state.call_timeout
        ))),
    }
}

/// POST /api/v1/offers
///
/// Free-form outreach message for an arbitrary job description.
pub async fn handle_generate_offer(
    State(state): State<AppState>,
    Json(request): Json<OfferRequest>,
) -> Result<Json<OfferDraft>, AppError> {
    let draft = draft_with_timeout(&state, &request.cv, &request.job_description).await?;
    Ok(Json(draft))
}
