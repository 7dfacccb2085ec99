use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};
use tracing::debug;

/// Optical character recognition through the Tesseract command-line tool.
/// The decoded image is re-encoded as PNG into a temp file and recognized text is read from stdout.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    lang: String,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<PathBuf>, lang: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            lang: lang.into(),
        }
    }

    pub fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let scratch = tempfile::Builder::new()
            .prefix("ats-ocr-")
            .suffix(".png")
            .tempfile()
            .context("failed to create temp file for OCR input")?;
        image
            .save_with_format(scratch.path(), ImageFormat::Png)
            .context("failed to write OCR input image")?;

        let output = Command::new(&self.binary)
            .arg(scratch.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .with_context(|| format!("failed to invoke {}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract exited with {}: {}", output.status, stderr.trim());
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), lang = %self.lang, "OCR complete");
        Ok(text)
    }
}
