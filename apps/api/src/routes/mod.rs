pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

/// Upper bound for one multipart upload request (all files of a batch together).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        .route("/api/v1/candidates", get(handlers::handle_list_candidates))
        .route(
            "/api/v1/candidates/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/candidates/:id", patch(handlers::handle_update_review))
        .route(
            "/api/v1/candidates/:id/match",
            get(handlers::handle_match_template),
        )
        .route(
            "/api/v1/candidates/:id/missing-skills",
            get(handlers::handle_missing_skills),
        )
        .with_state(state)
}
