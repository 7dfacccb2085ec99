use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// OpenAI-compatible base URL serving the sentence-embedding model.
    pub embedding_api_url: String,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub tesseract_path: PathBuf,
    pub ocr_lang: String,
    pub jd_templates_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            embedding_api_url: require_env("EMBEDDING_API_URL")?,
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dim: match optional_env("EMBEDDING_DIM") {
                Some(v) => v
                    .parse::<usize>()
                    .context("EMBEDDING_DIM must be a positive integer")?,
                None => DEFAULT_EMBEDDING_DIM,
            },
            tesseract_path: optional_env("TESSERACT_PATH")
                .unwrap_or_else(|| "tesseract".to_string())
                .into(),
            ocr_lang: optional_env("OCR_LANG").unwrap_or_else(|| "eng".to_string()),
            jd_templates_path: optional_env("JD_TEMPLATES_PATH")
                .unwrap_or_else(|| "job_templates.json".to_string())
                .into(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats unset and blank values the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
