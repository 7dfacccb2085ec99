//! Skill Extractor — derives a skill vocabulary from a job description and
//! detects which vocabulary terms a resume mentions.
//!
//! Matching is vocabulary-constrained: a resume can only ever "have" skills the
//! job description names.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

const STOP_WORDS: &[&str] = &[
    "the", "and", "with", "for", "you", "are", "our", "this", "that", "have",
];

/// Tokens shorter than this are never vocabulary terms.
const MIN_TERM_LEN: usize = 3;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z0-9+.#]+)\b").expect("word pattern is valid"));

/// Lowercased, deduplicated, lexicographically sorted candidate skill terms.
pub fn derive_vocabulary(jd_text: &str) -> Vec<String> {
    let flattened = jd_text.replace('\n', " ");
    let terms: BTreeSet<String> = WORD_RE
        .find_iter(&flattened)
        .map(|m| m.as_str().to_lowercase())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN && !STOP_WORDS.contains(&t.as_str()))
        .collect();
    terms.into_iter().collect()
}

/// Vocabulary terms that occur anywhere in the resume (case-insensitive substring),
/// in vocabulary order.
pub fn detect_skills(resume_text: &str, vocabulary: &[String]) -> Vec<String> {
    let haystack = resume_text.to_lowercase();
    vocabulary
        .iter()
        .filter(|term| haystack.contains(term.to_lowercase().as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD_FIXTURES: &[&str] = &[
        "Looking for Python and SQL skills.",
        "We are hiring a Senior Data Analyst with Power BI, Excel and SQL.\nYou will own our dashboards.",
        "The ideal candidate has C++ and C# and node.js experience; this role is for you",
        "",
        "a an to of in on at by",
    ];

    #[test]
    fn test_vocabulary_excludes_stop_words_and_short_tokens() {
        for jd in JD_FIXTURES {
            for term in derive_vocabulary(jd) {
                assert!(term.len() > 2, "short term {term:?} from {jd:?}");
                assert!(!STOP_WORDS.contains(&term.as_str()), "stop word {term:?} from {jd:?}");
            }
        }
    }

    #[test]
    fn test_vocabulary_is_sorted_lowercase_and_unique() {
        let vocab = derive_vocabulary("SQL sql Python PYTHON excel");
        assert_eq!(vocab, vec!["excel", "python", "sql"]);
    }

    #[test]
    fn test_vocabulary_keeps_dotted_tokens() {
        let vocab = derive_vocabulary("Experience with node.js and asp.net required");
        assert!(vocab.contains(&"node.js".to_string()));
        assert!(vocab.contains(&"asp.net".to_string()));
    }

    #[test]
    fn test_sample_job_description_vocabulary() {
        let vocab = derive_vocabulary("Looking for Python and SQL skills.");
        assert_eq!(vocab, vec!["looking", "python", "skills", "sql"]);
    }

    #[test]
    fn test_detect_skills_is_subset_in_vocabulary_order() {
        let vocab = derive_vocabulary("Looking for Python and SQL skills.");
        let detected = detect_skills("Used SQL and Python daily.", &vocab);
        assert_eq!(detected, vec!["python", "sql"]);
        assert!(detected.iter().all(|d| vocab.contains(d)));
    }

    #[test]
    fn test_detect_skills_matches_substrings() {
        let vocab = vec!["java".to_string()];
        // "javascript" contains "java"; substring matching is intentional.
        assert_eq!(detect_skills("JavaScript developer", &vocab), vec!["java"]);
    }

    #[test]
    fn test_detect_skills_empty_inputs() {
        assert!(detect_skills("", &["python".to_string()]).is_empty());
        assert!(detect_skills("python", &[]).is_empty());
    }
}
