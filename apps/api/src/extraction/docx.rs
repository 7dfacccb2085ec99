use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Returns the text of every paragraph in the main document part, one line each.
/// Images are skipped; table cells contribute their paragraphs like body text.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("not a valid DOCX archive")?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .with_context(|| format!("DOCX archive has no {DOCUMENT_PART}"))?
        .read_to_string(&mut xml)
        .with_context(|| format!("failed to read {DOCUMENT_PART}"))?;
    paragraphs_to_text(&xml)
}

fn paragraphs_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event().context("malformed document.xml")? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => lines.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => lines.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                current.push_str(&t.unescape().context("bad entity in document text")?)
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    /// Builds a minimal DOCX whose body holds one paragraph per entry.
    /// An empty entry becomes an empty paragraph.
    pub(crate) fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| {
                if p.is_empty() {
                    "<w:p/>".to_string()
                } else {
                    let escaped = p
                        .replace('&', "&amp;")
                        .replace('<', "&lt;")
                        .replace('>', "&gt;");
                    format!("<w:p><w:r><w:t xml:space=\"preserve\">{escaped}</w:t></w:r></w:p>")
                }
            })
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_one_line_per_paragraph() {
        let bytes = docx_fixture(&["Jane Doe", "", "Experience", "Rust & Go"]);
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "Jane Doe\n\nExperience\nRust & Go");
    }

    #[test]
    fn test_tabs_and_breaks_inside_paragraph() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(paragraphs_to_text(xml).unwrap(), "a\tb\nc");
    }

    #[test]
    fn test_text_outside_runs_is_ignored() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:r><w:instrText>PAGE</w:instrText><w:t>visible</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(paragraphs_to_text(xml).unwrap(), "visible");
    }

    #[test]
    fn test_missing_document_part_fails() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_docx_text(&bytes).unwrap_err();
        assert!(format!("{err:#}").contains(DOCUMENT_PART));
    }

    #[test]
    fn test_not_a_zip_fails() {
        assert!(extract_docx_text(b"PK? nope").is_err());
    }
}
