use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateRecord, ReviewStatus, StoredCandidate};

const CREATE_CANDIDATES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS candidates (
    id          UUID PRIMARY KEY,
    filename    TEXT NOT NULL,
    name        TEXT NOT NULL,
    email       TEXT,
    phone       TEXT,
    skills      TEXT NOT NULL,
    jd_skills   TEXT NOT NULL,
    experience  TEXT NOT NULL,
    education   TEXT NOT NULL,
    score       DOUBLE PRECISION NOT NULL,
    status      TEXT NOT NULL DEFAULT 'Pending',
    notes       TEXT,
    upload_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_updated TIMESTAMPTZ
)
"#;

const ADD_LAST_UPDATED_COLUMN: &str =
    "ALTER TABLE candidates ADD COLUMN IF NOT EXISTS last_updated TIMESTAMPTZ";

/// Creates the `candidates` table on first start.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_CANDIDATES_TABLE).execute(pool).await?;
    sqlx::query(ADD_LAST_UPDATED_COLUMN).execute(pool).await?;
    info!("Candidates table ready");
    Ok(())
}

/// Persists one scored record. Skills are stored comma-joined.
pub async fn insert_record(
    pool: &PgPool,
    filename: &str,
    record: &CandidateRecord,
) -> Result<StoredCandidate, sqlx::Error> {
    sqlx::query_as::<_, StoredCandidate>(
        r#"
        INSERT INTO candidates
            (id, filename, name, email, phone, skills, jd_skills,
             experience, education, score, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(filename)
    .bind(&record.name)
    .bind(&record.email)
    .bind(&record.phone)
    .bind(record.skills_joined())
    .bind(record.jd_skills_joined())
    .bind(&record.experience)
    .bind(&record.education)
    .bind(record.score)
    .bind(ReviewStatus::default().as_str())
    .fetch_one(pool)
    .await
}

pub async fn find_candidate(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<StoredCandidate>, sqlx::Error> {
    sqlx::query_as::<_, StoredCandidate>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Records a recruiter review. Fields left as `None` keep their stored value.
/// Returns `None` when no candidate has this id.
pub async fn update_review(
    pool: &PgPool,
    id: Uuid,
    status: Option<ReviewStatus>,
    notes: Option<&str>,
) -> Result<Option<StoredCandidate>, sqlx::Error> {
    sqlx::query_as::<_, StoredCandidate>(
        r#"
        UPDATE candidates
        SET status = COALESCE($2, status),
            notes = COALESCE($3, notes),
            last_updated = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.map(|s| s.as_str()))
    .bind(notes)
    .fetch_optional(pool)
    .await
}

/// All stored candidates, newest first.
pub async fn list_candidates(pool: &PgPool) -> Result<Vec<StoredCandidate>, sqlx::Error> {
    sqlx::query_as::<_, StoredCandidate>("SELECT * FROM candidates ORDER BY upload_date DESC")
        .fetch_all(pool)
        .await
}

/// Text used when re-matching a stored resume: experience, education and skills.
pub async fn read_stored_text(pool: &PgPool, id: Uuid) -> Result<String, AppError> {
    let candidate = find_candidate(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    Ok(stored_text(&candidate))
}

pub fn stored_text(candidate: &StoredCandidate) -> String {
    format!(
        "{} {} {}",
        candidate.experience, candidate.education, candidate.skills
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_stored_text_concatenates_sections_and_skills() {
        let candidate = StoredCandidate {
            id: Uuid::new_v4(),
            filename: "cv.pdf".to_string(),
            name: "Jane Doe".to_string(),
            email: None,
            phone: None,
            skills: "python, sql".to_string(),
            jd_skills: "python, sql, excel".to_string(),
            experience: "built reports".to_string(),
            education: "bsc cs".to_string(),
            score: 0.7,
            status: "Pending".to_string(),
            notes: None,
            upload_date: Utc::now(),
            last_updated: None,
        };
        assert_eq!(stored_text(&candidate), "built reports bsc cs python, sql");
    }
}
