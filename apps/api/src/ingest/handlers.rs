use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::ingest::{IncomingMessage, IngestOutcome};
use crate::state::AppState;

/// POST /api/v1/jobs/ingest
///
/// 201 with the new posting, or 200 with the id of the record that already
/// covers this message.
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(message): Json<IncomingMessage>,
) -> Result<(StatusCode, Json<IngestOutcome>), AppError> {
    let outcome = state.ingest.ingest(message).await?;
    let status = match outcome {
        IngestOutcome::Created { .. } => StatusCode::CREATED,
        IngestOutcome::Duplicate { .. } => StatusCode::OK,
    };
    Ok((status, Json(outcome)))
}
