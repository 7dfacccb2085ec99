use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::text_extractor::RawDocument;
use crate::models::candidate::{ReviewStatus, StoredCandidate};
use crate::pipeline::repository::{
    find_candidate, insert_record, list_candidates, read_stored_text, update_review,
};
use crate::pipeline::runner::{score_text, DocumentFailure};
use crate::scoring::combiner::{missing_skills, score_percentage, MatchTier};
use crate::state::AppState;
use crate::templates::JobTemplates;

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub filename: String,
    pub candidate_id: Uuid,
    pub score: f64,
    /// Rounded to two decimals.
    pub score_percentage: f64,
    pub match_quality: MatchTier,
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UploadSummary {
    /// Best match first.
    pub results: Vec<UploadResult>,
    pub failures: Vec<DocumentFailure>,
}

#[derive(Debug, Serialize)]
pub struct CandidateSummary {
    #[serde(flatten)]
    pub candidate: StoredCandidate,
    pub score_percentage: f64,
    pub match_quality: MatchTier,
}

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub template: String,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub candidate_id: Uuid,
    pub template: String,
    pub score: f64,
    pub score_percentage: f64,
    pub match_quality: MatchTier,
}

#[derive(Debug, Deserialize)]
pub struct RequiredSkillsQuery {
    pub required: String,
}

#[derive(Debug, Serialize)]
pub struct MissingSkillsResponse {
    pub candidate_id: Uuid,
    pub missing: Vec<String>,
    pub all_matched: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewUpdate {
    pub status: Option<ReviewStatus>,
    pub notes: Option<String>,
}

impl ReviewUpdate {
    fn validate(&self) -> Result<(), AppError> {
        if self.status.is_none() && self.notes.is_none() {
            return Err(AppError::Validation(
                "Provide a review status or notes to update.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct UploadForm {
    job_description: Option<String>,
    template: Option<String>,
    files: Vec<RawDocument>,
}

/// POST /api/v1/candidates/upload
///
/// Multipart fields: `job_description` (text) or `template` (name), and one or
/// more `files`. Each file is processed independently; failures are reported
/// alongside successes.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadSummary>, AppError> {
    let form = read_upload_form(multipart).await?;
    let jd_text = resolve_job_description(
        form.job_description.as_deref(),
        form.template.as_deref(),
        &state.templates,
    )?;
    if form.files.is_empty() {
        return Err(AppError::Validation(
            "Please upload at least one resume file to continue.".to_string(),
        ));
    }

    info!("Processing {} uploaded resumes", form.files.len());
    let report = state.pipeline.run_batch(form.files, &jd_text).await;

    let mut results = Vec::with_capacity(report.processed.len());
    let mut failures = report.failures;
    for processed in report.processed {
        match insert_record(&state.db, &processed.filename, &processed.record).await {
            Ok(stored) => results.push(UploadResult {
                filename: processed.filename,
                candidate_id: stored.id,
                score: stored.score,
                score_percentage: round2(score_percentage(stored.score)),
                match_quality: MatchTier::from_score(stored.score),
                upload_date: stored.upload_date,
            }),
            Err(e) => {
                error!(filename = %processed.filename, "Failed to store candidate: {e}");
                failures.push(DocumentFailure {
                    filename: processed.filename,
                    message: "Failed to store the processed resume".to_string(),
                });
            }
        }
    }
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(Json(UploadSummary { results, failures }))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateSummary>>, AppError> {
    let candidates = list_candidates(&state.db).await?;
    let summaries = candidates
        .into_iter()
        .map(|candidate| CandidateSummary {
            score_percentage: round2(score_percentage(candidate.score)),
            match_quality: MatchTier::from_score(candidate.score),
            candidate,
        })
        .collect();
    Ok(Json(summaries))
}

/// GET /api/v1/candidates/:id/match?template=NAME
pub async fn handle_match_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<TemplateQuery>,
) -> Result<Json<MatchResponse>, AppError> {
    let jd_text = state
        .templates
        .job_description_text(&params.template)
        .ok_or_else(|| AppError::NotFound(format!("Template '{}' not found", params.template)))?;
    let stored_text = read_stored_text(&state.db, id).await?;
    let rescored = score_text(&stored_text, jd_text, state.pipeline.embedder()).await?;

    Ok(Json(MatchResponse {
        candidate_id: id,
        template: params.template,
        score: rescored.score,
        score_percentage: round2(score_percentage(rescored.score)),
        match_quality: MatchTier::from_score(rescored.score),
    }))
}

/// GET /api/v1/candidates/:id/missing-skills?required=a,b
pub async fn handle_missing_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<RequiredSkillsQuery>,
) -> Result<Json<MissingSkillsResponse>, AppError> {
    let candidate = find_candidate(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    let missing = missing_skills(&candidate.skill_list(), &params.required);

    Ok(Json(MissingSkillsResponse {
        candidate_id: id,
        all_matched: missing.is_empty(),
        missing,
    }))
}

/// PATCH /api/v1/candidates/:id
///
/// Saves the recruiter's review status and notes, stamping `last_updated`.
pub async fn handle_update_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewUpdate>,
) -> Result<Json<StoredCandidate>, AppError> {
    req.validate()?;
    let updated = update_review(&state.db, id, req.status, req.notes.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    info!(candidate_id = %id, status = %updated.status, "Review saved");
    Ok(Json(updated))
}

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.templates.names().into_iter().map(String::from).collect())
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" | "template" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid '{name}' field: {e}")))?;
                if name == "template" {
                    form.template = Some(value);
                } else {
                    form.job_description = Some(value);
                }
            }
            "files" => {
                let filename = field
                    .file_name()
                    .map(String::from)
                    .ok_or_else(|| AppError::Validation("Uploaded file has no name".to_string()))?;
                let content = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read upload '{filename}': {e}"))
                })?;
                form.files.push(RawDocument::new(filename, content));
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Pasted text wins over a template; one of the two is required.
fn resolve_job_description(
    pasted: Option<&str>,
    template: Option<&str>,
    templates: &JobTemplates,
) -> Result<String, AppError> {
    if let Some(text) = pasted.filter(|t| !t.trim().is_empty()) {
        return Ok(text.to_string());
    }
    if let Some(name) = template.filter(|t| !t.trim().is_empty()) {
        return templates
            .job_description_text(name)
            .map(String::from)
            .ok_or_else(|| AppError::NotFound(format!("Template '{name}' not found")));
    }
    Err(AppError::Validation(
        "Please paste a Job Description before processing.".to_string(),
    ))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> JobTemplates {
        JobTemplates::from_json(r#"{"Data Analyst": {"jd": "Python and SQL"}}"#).unwrap()
    }

    #[test]
    fn test_pasted_description_wins() {
        let jd = resolve_job_description(Some("Rust"), Some("Data Analyst"), &templates()).unwrap();
        assert_eq!(jd, "Rust");
    }

    #[test]
    fn test_blank_paste_falls_back_to_template() {
        let jd = resolve_job_description(Some("  "), Some("Data Analyst"), &templates()).unwrap();
        assert_eq!(jd, "Python and SQL");
    }

    #[test]
    fn test_unknown_template_is_not_found() {
        let err = resolve_job_description(None, Some("Chef"), &templates()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_missing_description_is_validation_error() {
        let err = resolve_job_description(None, None, &templates()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_empty_review_update_is_rejected() {
        let update = ReviewUpdate {
            status: None,
            notes: None,
        };
        assert!(matches!(update.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_review_update_with_notes_only_is_accepted() {
        let update: ReviewUpdate =
            serde_json::from_str(r#"{"notes": "Strong SQL, schedule a call"}"#).unwrap();
        assert!(update.status.is_none());
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(72.3456), 72.35);
        assert_eq!(round2(0.0), 0.0);
    }
}
