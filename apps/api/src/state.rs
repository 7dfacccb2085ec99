use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::pipeline::runner::Pipeline;
use crate::templates::JobTemplates;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Embedder and OCR engine, built once at startup and shared read-only.
    pub pipeline: Pipeline,
    pub templates: Arc<JobTemplates>,
    pub config: Config,
}
