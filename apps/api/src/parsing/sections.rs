//! Section Extractor — heading-keyword-triggered capture of a contiguous block of lines.

pub const EXPERIENCE_HEADINGS: &[&str] = &["experience", "work history"];
pub const EDUCATION_HEADINGS: &[&str] = &["education", "academic"];

/// Returns the lowercased lines following the first heading line, up to the first blank line.
///
/// Every line containing a heading keyword is dropped, even while capturing.
/// Capture never resumes after the blank line that ends it.
/// Returns an empty string when no heading keyword appears.
pub fn extract_section(text: &str, heading_keywords: &[&str]) -> String {
    let lowered = text.to_lowercase();
    let mut section: Vec<&str> = Vec::new();
    let mut capturing = false;

    for line in lowered.split('\n') {
        if heading_keywords.iter().any(|k| line.contains(k)) {
            capturing = true;
            continue;
        }
        if capturing && line.trim().is_empty() {
            break;
        }
        if capturing {
            section.push(line);
        }
    }

    section.join("\n").trim().to_string()
}
