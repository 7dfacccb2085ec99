mod config;
mod db;
mod errors;
mod extraction;
mod models;
mod parsing;
mod pipeline;
mod routes;
mod scoring;
mod state;
mod templates;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::ocr::TesseractOcr;
use crate::pipeline::runner::Pipeline;
use crate::routes::build_router;
use crate::scoring::embedding::{Embedder, HttpEmbedder};
use crate::state::AppState;
use crate::templates::JobTemplates;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Embedding model: built once, shared by every pipeline run
    let embedder = build_embedder(&config)?;
    info!(
        "Embedder initialized (backend: {}, dimensions: {})",
        embedder.backend(),
        embedder.dimensions()
    );

    let ocr = TesseractOcr::new(config.tesseract_path.clone(), config.ocr_lang.clone());
    let templates = JobTemplates::load(&config.jd_templates_path)?;

    // Build app state
    let state = AppState {
        db,
        pipeline: Pipeline::new(embedder, ocr),
        templates: Arc::new(templates),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let embedder = HttpEmbedder::new(
        &config.embedding_api_url,
        config.embedding_model.clone(),
        config.embedding_api_key.clone(),
        config.embedding_dim,
    )?;
    Ok(Arc::new(embedder))
}
