//! Named job-description templates loaded from a JSON file:
//! `{ "<name>": { "jd": "<job description text>" }, ... }`

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTemplate {
    pub jd: String,
}

#[derive(Debug, Clone, Default)]
pub struct JobTemplates {
    templates: BTreeMap<String, JobTemplate>,
}

impl JobTemplates {
    /// Loads templates from disk. A missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Job template file {} not found; no templates loaded", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read job templates from {}", path.display()))?;
        let templates = Self::from_json(&raw)
            .with_context(|| format!("invalid job template file {}", path.display()))?;
        info!("Loaded {} job templates", templates.templates.len());
        Ok(templates)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let templates: BTreeMap<String, JobTemplate> = serde_json::from_str(raw)?;
        Ok(Self { templates })
    }

    pub fn job_description_text(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|t| t.jd.as_str())
    }

    /// Template names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TEMPLATES_JSON: &str = r#"{
        "Data Analyst": { "jd": "Looking for Python and SQL skills." },
        "Backend Engineer": { "jd": "Rust, PostgreSQL and Kubernetes." }
    }"#;

    #[test]
    fn test_lookup_by_name() {
        let templates = JobTemplates::from_json(TEMPLATES_JSON).unwrap();
        assert_eq!(
            templates.job_description_text("Data Analyst"),
            Some("Looking for Python and SQL skills.")
        );
        assert_eq!(templates.job_description_text("Designer"), None);
    }

    #[test]
    fn test_names_are_sorted() {
        let templates = JobTemplates::from_json(TEMPLATES_JSON).unwrap();
        assert_eq!(templates.names(), vec!["Backend Engineer", "Data Analyst"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TEMPLATES_JSON.as_bytes()).unwrap();
        let templates = JobTemplates::load(file.path()).unwrap();
        assert_eq!(templates.names().len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let templates = JobTemplates::load(Path::new("/nonexistent/templates.json")).unwrap();
        assert!(templates.names().is_empty());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ \"x\": 1 }").unwrap();
        assert!(JobTemplates::load(file.path()).is_err());
    }
}
