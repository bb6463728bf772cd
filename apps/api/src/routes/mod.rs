pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as offers;
use crate::ingest::handlers as ingest;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs API
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs/ingest", post(ingest::handle_ingest))
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job).delete(jobs::handle_delete_job),
        )
        .route("/api/v1/jobs/:id/reprocess", post(jobs::handle_reprocess))
        .route("/api/v1/jobs/:id/offer", post(jobs::handle_job_offer))
        // Offers API
        .route("/api/v1/offers", post(offers::handle_generate_offer))
        .with_state(state)
}
