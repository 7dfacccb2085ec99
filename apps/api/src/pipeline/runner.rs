//! Pipeline runner — document → text → entities → hybrid score → `CandidateRecord`.
//!
//! Each run is atomic: it returns a fully scored record or an error, never a
//! partial record. Batches isolate failures per document.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::extraction::ocr::TesseractOcr;
use crate::extraction::text_extractor::{extract_text, RawDocument};
use crate::models::candidate::CandidateRecord;
use crate::parsing::entities::extract_entities;
use crate::scoring::combiner::{final_score, jaccard_overlap};
use crate::parsing::entities::ExtractedEntities;
use crate::scoring::embedding::{semantic_score, semantic_score_against, Embedder};

/// Shared, read-only pipeline dependencies. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    embedder: Arc<dyn Embedder>,
    ocr: TesseractOcr,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub filename: String,
    pub record: CandidateRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub message: String,
}

/// A job description together with its embedding, computed once per batch.
#[derive(Debug, Clone)]
pub struct EmbeddedJobDescription {
    pub text: String,
    pub vector: Vec<f32>,
}

/// Outcome of a batch: one entry per input document, in input order.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub processed: Vec<ProcessedDocument>,
    pub failures: Vec<DocumentFailure>,
}

impl Pipeline {
    pub fn new(embedder: Arc<dyn Embedder>, ocr: TesseractOcr) -> Self {
        Self { embedder, ocr }
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub async fn embed_job_description(
        &self,
        jd_text: &str,
    ) -> Result<EmbeddedJobDescription, PipelineError> {
        Ok(EmbeddedJobDescription {
            text: jd_text.to_string(),
            vector: self.embedder.embed(jd_text).await?,
        })
    }

    /// Runs the full pipeline over one document.
    pub async fn run(
        &self,
        document: RawDocument,
        jd: &EmbeddedJobDescription,
    ) -> Result<CandidateRecord, PipelineError> {
        let filename = document.filename.clone();
        let ocr = self.ocr.clone();

        // Readers are blocking (and pdf-extract can panic on malformed input);
        // a panic surfaces here as a JoinError.
        let text = tokio::task::spawn_blocking(move || extract_text(&document, &ocr))
            .await
            .map_err(|e| PipelineError::extraction(&filename, format!("reader aborted: {e}")))??;

        let record = score_text_against(&text, jd, self.embedder()).await?;
        info!(
            filename = %filename,
            score = record.score,
            skills = record.skills.len(),
            "Processed document"
        );
        Ok(record)
    }

    /// Processes documents one after another. A failing document is reported and skipped.
    /// The job description is embedded once for the whole batch.
    pub async fn run_batch(&self, documents: Vec<RawDocument>, jd_text: &str) -> BatchReport {
        let mut report = BatchReport::default();
        let jd = match self.embed_job_description(jd_text).await {
            Ok(jd) => jd,
            Err(e) => {
                let message = e.to_string();
                warn!("Failed to embed job description: {message}");
                report.failures = documents
                    .into_iter()
                    .map(|document| DocumentFailure {
                        filename: document.filename,
                        message: message.clone(),
                    })
                    .collect();
                return report;
            }
        };

        for document in documents {
            let filename = document.filename.clone();
            match self.run(document, &jd).await {
                Ok(record) => report.processed.push(ProcessedDocument { filename, record }),
                Err(e) => {
                    warn!(filename = %filename, "Failed to process document: {e}");
                    report.failures.push(DocumentFailure {
                        filename,
                        message: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// Scores already-extracted resume text against a job description.
///
/// Semantic similarity uses the full texts; overlap uses detected skills vs the
/// job-description vocabulary.
pub async fn score_text(
    text: &str,
    jd_text: &str,
    embedder: &dyn Embedder,
) -> Result<CandidateRecord, PipelineError> {
    let entities = extract_entities(text, jd_text);
    let semantic = semantic_score(embedder, text, jd_text).await?;
    Ok(build_record(entities, semantic))
}

/// `score_text` with the job description already embedded.
pub async fn score_text_against(
    text: &str,
    jd: &EmbeddedJobDescription,
    embedder: &dyn Embedder,
) -> Result<CandidateRecord, PipelineError> {
    let entities = extract_entities(text, &jd.text);
    let semantic = semantic_score_against(embedder, text, &jd.vector).await?;
    Ok(build_record(entities, semantic))
}

fn build_record(entities: ExtractedEntities, semantic: f32) -> CandidateRecord {
    let overlap = jaccard_overlap(&entities.skills, &entities.jd_skills);
    CandidateRecord {
        name: entities.name,
        email: entities.email,
        phone: entities.phone,
        skills: entities.skills,
        jd_skills: entities.jd_skills,
        experience: entities.experience,
        education: entities.education,
        score: final_score(f64::from(semantic), overlap),
    }
}
