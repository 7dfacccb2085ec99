//! Score Combiner — blends semantic similarity with lexical skill overlap,
//! and bands the result into the match tiers shown to recruiters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Intersection over union of two skill sets, compared case-insensitively.
/// 0.0 when either side is empty.
pub fn jaccard_overlap<A, B>(resume_skills: &[A], jd_skills: &[B]) -> f64
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let resume: HashSet<String> = resume_skills
        .iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect();
    let jd: HashSet<String> = jd_skills.iter().map(|s| s.as_ref().to_lowercase()).collect();

    if resume.is_empty() || jd.is_empty() {
        return 0.0;
    }

    let intersection = resume.intersection(&jd).count();
    let union = resume.union(&jd).count();
    intersection as f64 / union as f64
}

/// Arithmetic mean of the two signals. Negative cosine similarity is not clipped.
pub fn final_score(semantic: f64, overlap: f64) -> f64 {
    (semantic + overlap) / 2.0
}

pub fn score_percentage(score: f64) -> f64 {
    score * 100.0
}

/// Three-tier banding of a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    #[serde(rename = "Excellent Match")]
    Excellent,
    #[serde(rename = "Good Match")]
    Good,
    #[serde(rename = "Low Match")]
    Low,
}

impl MatchTier {
    pub fn from_score(score: f64) -> Self {
        let pct = score_percentage(score);
        if pct >= 85.0 {
            MatchTier::Excellent
        } else if pct >= 70.0 {
            MatchTier::Good
        } else {
            MatchTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Excellent => "Excellent Match",
            MatchTier::Good => "Good Match",
            MatchTier::Low => "Low Match",
        }
    }
}

/// Required skills (comma-separated) the candidate does not have, in the order given.
/// An empty result means every required skill is matched.
pub fn missing_skills<S: AsRef<str>>(candidate_skills: &[S], required_csv: &str) -> Vec<String> {
    let have: HashSet<String> = candidate_skills
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    required_csv
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| !have.contains(s))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
