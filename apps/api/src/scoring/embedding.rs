//! Semantic Scorer — sentence embeddings behind a pluggable `Embedder` trait.
//!
//! `HttpEmbedder` talks to an OpenAI-compatible `/embeddings` endpoint serving a
//! sentence-transformer model (all-MiniLM-L6-v2 by default). Tests use the
//! deterministic `HashEmbedder` stub instead.
//!
//! `AppState` holds one `Arc<dyn Embedder>` built at startup and shared read-only.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding service returned no vectors")]
    EmptyResponse,

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// The embedder trait. Implement this to swap embedding backends without
/// touching the pipeline or handlers.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Fixed-length vector for `text`. Empty text yields a zero vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn dimensions(&self) -> usize;

    /// "http" | "hash" — for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Cosine similarity in [-1, 1]. Zero vectors and length mismatches give 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

/// Embeds both texts and returns their cosine similarity.
pub async fn semantic_score(
    embedder: &dyn Embedder,
    text_a: &str,
    text_b: &str,
) -> Result<f32, EmbeddingError> {
    let vec_b = embedder.embed(text_b).await?;
    semantic_score_against(embedder, text_a, &vec_b).await
}

/// Like `semantic_score`, with the second side already embedded.
pub async fn semantic_score_against(
    embedder: &dyn Embedder,
    text: &str,
    target: &[f32],
) -> Result<f32, EmbeddingError> {
    let vector = embedder.embed(text).await?;
    Ok(cosine_similarity(&vector, target))
}

// ────────────────────────────────────────────────────────────────────────────
// HttpEmbedder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for OpenAI-compatible embedding servers (OpenAI, text-embeddings-inference, Ollama).
/// Retries on 429, 5xx and transport errors with exponential backoff.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
}

impl HttpEmbedder {
    pub fn new(
        base_url: &str,
        model: String,
        api_key: Option<String>,
        dim: usize,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        anyhow::ensure!(dim > 0, "embedding dimension must be positive");
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build embedding HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model,
            api_key,
            dim,
        })
    }

    async fn request_once(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut request = self.client.post(&self.endpoint).json(&EmbeddingRequest {
            model: &self.model,
            input: [text],
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)?;
        if embedding.len() != self.dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dim,
                actual: embedding.len(),
            });
        }
        Ok(embedding)
    }
}

fn is_retryable(err: &EmbeddingError) -> bool {
    match err {
        EmbeddingError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        EmbeddingError::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dim]);
        }

        let mut attempt = 0;
        loop {
            match self.request_once(text).await {
                Ok(embedding) => {
                    debug!(chars = text.len(), dim = embedding.len(), "embedded text");
                    return Ok(embedding);
                }
                Err(e) if is_retryable(&e) && attempt + 1 < MAX_RETRIES => {
                    attempt += 1;
                    // Exponential backoff: 500ms, 1s
                    let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                    warn!(
                        "Embedding attempt {} failed ({e}), retrying after {}ms...",
                        attempt,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashEmbedder
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
#[cfg(test)]
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-words stub for tests. No model, no network.
/// Each lowercased alphanumeric token is hashed (FNV-1a) into a signed bucket;
/// the result is L2-normalized.
#[cfg(test)]
pub struct HashEmbedder {
    dim: usize,
}

#[cfg(test)]
impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dim: 384 }
    }
}

#[cfg(test)]
impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dim];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dim as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[cfg(test)]
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn backend(&self) -> &'static str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_is_one() {
        let v = vec![0.3, -0.2, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_is_negative_one() {
        let a = vec![1.0, 2.0];
        let b = vec![-1.0, -2.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs_are_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_hash_embedder_is_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_sync("Python and SQL");
        let b = embedder.embed_sync("python AND sql");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hash_embedder_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed_sync("");
        assert_eq!(v.len(), 16);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_semantic_score_with_empty_text_is_defined() {
        let embedder = HashEmbedder::default();
        let score = semantic_score(&embedder, "", "Looking for Python").await.unwrap();
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn test_semantic_score_prefers_overlapping_text() {
        let embedder = HashEmbedder::default();
        let jd = "python sql data pipelines";
        let close = semantic_score(&embedder, "python sql pipelines", jd).await.unwrap();
        let far = semantic_score(&embedder, "watercolour painting", jd).await.unwrap();
        assert!(close > far, "close={close} far={far}");
    }

    #[tokio::test]
    async fn test_score_against_precomputed_vector_matches_pairwise() {
        let embedder = HashEmbedder::default();
        let jd = "python sql data pipelines";
        let target = embedder.embed(jd).await.unwrap();
        let direct = semantic_score(&embedder, "python pipelines", jd).await.unwrap();
        let reused = semantic_score_against(&embedder, "python pipelines", &target)
            .await
            .unwrap();
        assert_eq!(direct, reused);
    }

    #[tokio::test]
    async fn test_http_embedder_skips_request_for_empty_text() {
        // Unroutable endpoint: any request would fail.
        let embedder =
            HttpEmbedder::new("http://127.0.0.1:9", "test-model".to_string(), None, 8).unwrap();
        let v = embedder.embed("   ").await.unwrap();
        assert_eq!(v, vec![0.0; 8]);
    }

    #[test]
    fn test_http_embedder_rejects_blank_model() {
        assert!(HttpEmbedder::new("http://localhost", " ".to_string(), None, 8).is_err());
    }

    #[test]
    fn test_retry_policy() {
        assert!(is_retryable(&EmbeddingError::Api {
            status: 429,
            message: String::new()
        }));
        assert!(is_retryable(&EmbeddingError::Api {
            status: 503,
            message: String::new()
        }));
        assert!(!is_retryable(&EmbeddingError::Api {
            status: 400,
            message: String::new()
        }));
        assert!(!is_retryable(&EmbeddingError::EmptyResponse));
    }
}
