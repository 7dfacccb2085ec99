//! Entity Extractor — name, contact fields, skills and sections from resume text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parsing::sections::{extract_section, EDUCATION_HEADINGS, EXPERIENCE_HEADINGS};
use crate::parsing::skills::{derive_vocabulary, detect_skills};

/// A first line with more words than this is treated as prose, not a name.
const MAX_NAME_WORDS: usize = 4;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("email pattern is valid"));

// Loose on purpose: postal codes and other digit runs can match.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?\d{1,3}[\s-])?(?:\(?\d{2,4}\)?[\s-]?)?\d{6,10}")
        .expect("phone pattern is valid")
});

/// Every candidate field except the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub jd_skills: Vec<String>,
    pub experience: String,
    pub education: String,
}

pub fn extract_entities(text: &str, jd_text: &str) -> ExtractedEntities {
    let jd_skills = derive_vocabulary(jd_text);
    let skills = detect_skills(text, &jd_skills);

    ExtractedEntities {
        name: guess_name(text),
        email: EMAIL_RE.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE_RE.find(text).map(|m| m.as_str().to_string()),
        skills,
        jd_skills,
        experience: extract_section(text, EXPERIENCE_HEADINGS),
        education: extract_section(text, EDUCATION_HEADINGS),
    }
}

/// First non-blank line, trimmed, if it is short enough to be a name.
fn guess_name(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| line.split_whitespace().count() <= MAX_NAME_WORDS)
        .map(String::from)
        .unwrap_or_default()
}
