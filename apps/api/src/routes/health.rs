use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and embedding backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let embedder = state.pipeline.embedder();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ats-api",
        "embedding_backend": embedder.backend(),
        "embedding_model": state.config.embedding_model,
        "embedding_dimensions": embedder.dimensions(),
    }))
}
