//! Text Extractor — turns an uploaded PDF, DOCX or image scan into plain text.

use bytes::Bytes;

use crate::errors::PipelineError;
use crate::extraction::docx::extract_docx_text;
use crate::extraction::ocr::TesseractOcr;

/// Reader selected from the lowercased file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Anything else is treated as a scanned image.
    Image,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            _ => DocumentFormat::Image,
        }
    }
}

/// An uploaded file. Lives for one pipeline run and is never persisted.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub content: Bytes,
    pub extension: String,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let extension = extension_of(&filename);
        Self {
            filename,
            content: content.into(),
            extension,
        }
    }

    pub fn format(&self) -> DocumentFormat {
        DocumentFormat::from_extension(&self.extension)
    }
}

/// Text after the last `.`, lowercased. A name without a dot yields the whole name.
fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Extracts plain text from a document. Empty text is a valid result.
pub fn extract_text(document: &RawDocument, ocr: &TesseractOcr) -> Result<String, PipelineError> {
    let filename = document.filename.as_str();
    match document.format() {
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(&document.content)
            .map_err(|e| PipelineError::extraction(filename, e)),
        DocumentFormat::Docx => {
            extract_docx_text(&document.content)
                .map_err(|e| PipelineError::extraction(filename, format!("{e:#}")))
        }
        DocumentFormat::Image => {
            let image = image::load_from_memory(&document.content).map_err(|_| {
                PipelineError::UnsupportedFormat {
                    filename: filename.to_string(),
                }
            })?;
            ocr.recognize(&image)
                .map_err(|e| PipelineError::extraction(filename, format!("{e:#}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::docx::tests::docx_fixture;

    fn ocr() -> TesseractOcr {
        TesseractOcr::new("tesseract", "eng")
    }

    #[test]
    fn test_extension_is_lowercased_last_segment() {
        assert_eq!(RawDocument::new("Jane.Doe.PDF", Vec::<u8>::new()).extension, "pdf");
        assert_eq!(RawDocument::new("resume.Docx", Vec::<u8>::new()).extension, "docx");
        assert_eq!(RawDocument::new("scan", Vec::<u8>::new()).extension, "scan");
    }

    #[test]
    fn test_dispatch_on_extension() {
        assert_eq!(RawDocument::new("a.pdf", Vec::<u8>::new()).format(), DocumentFormat::Pdf);
        assert_eq!(RawDocument::new("a.docx", Vec::<u8>::new()).format(), DocumentFormat::Docx);
        assert_eq!(RawDocument::new("a.png", Vec::<u8>::new()).format(), DocumentFormat::Image);
        assert_eq!(RawDocument::new("a.txt", Vec::<u8>::new()).format(), DocumentFormat::Image);
    }

    #[test]
    fn test_docx_text_extracted() {
        let doc = RawDocument::new("cv.docx", docx_fixture(&["Jane Doe", "jane@example.com"]));
        let text = extract_text(&doc, &ocr()).unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("jane@example.com"));
    }

    #[test]
    fn test_corrupt_docx_is_extraction_error() {
        let doc = RawDocument::new("broken.docx", b"definitely not a zip".to_vec());
        let err = extract_text(&doc, &ocr()).unwrap_err();
        match err {
            PipelineError::Extraction { filename, .. } => assert_eq!(filename, "broken.docx"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_error() {
        let doc = RawDocument::new("bad.pdf", b"this is not a pdf".to_vec());
        match extract_text(&doc, &ocr()).unwrap_err() {
            PipelineError::Extraction { filename, cause } => {
                assert_eq!(filename, "bad.pdf");
                assert!(!cause.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_undecodable_image_is_unsupported_format() {
        let doc = RawDocument::new("notes.txt", b"plain words".to_vec());
        match extract_text(&doc, &ocr()).unwrap_err() {
            PipelineError::UnsupportedFormat { filename } => assert_eq!(filename, "notes.txt"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
