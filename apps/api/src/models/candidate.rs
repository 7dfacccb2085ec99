use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Separator used for skill lists in storage and API payloads.
pub const SKILL_SEPARATOR: &str = ", ";

/// Structured result of one pipeline run over one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Vocabulary terms found in the resume, in vocabulary order.
    pub skills: Vec<String>,
    /// Vocabulary derived from the job description.
    pub jd_skills: Vec<String>,
    pub experience: String,
    pub education: String,
    pub score: f64,
}

impl CandidateRecord {
    pub fn skills_joined(&self) -> String {
        self.skills.join(SKILL_SEPARATOR)
    }

    pub fn jd_skills_joined(&self) -> String {
        self.jd_skills.join(SKILL_SEPARATOR)
    }
}

/// Recruiter review state of a stored candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[default]
    Pending,
    Shortlisted,
    Interviewed,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Shortlisted => "Shortlisted",
            ReviewStatus::Interviewed => "Interviewed",
            ReviewStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredCandidate {
    pub id: Uuid,
    pub filename: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: String,
    pub jd_skills: String,
    pub experience: String,
    pub education: String,
    pub score: f64,
    pub status: String,
    pub notes: Option<String>,
    pub upload_date: DateTime<Utc>,
    /// Set by the last recruiter review, if any.
    pub last_updated: Option<DateTime<Utc>>,
}

impl StoredCandidate {
    /// Skills split back out of their comma-joined column.
    pub fn skill_list(&self) -> Vec<String> {
        split_skills(&self.skills)
    }
}

pub fn split_skills(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
