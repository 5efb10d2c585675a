use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::pdf::PageImage;

pub trait OcrEngine {
    /// Recognizes text from a page image. The output is noisy by nature:
    /// misreads, inconsistent whitespace, possibly empty text. NUL bytes are
    /// stripped; nothing else is corrected here.
    fn recognize(&self, image: &PageImage, lang: &str) -> Result<String>;
}

/// Shells out to the tesseract CLI. The language hint is a tesseract traineddata
/// name, "ben" for the Bangla voter-list layout.
pub struct TesseractOcr;

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &PageImage, lang: &str) -> Result<String> {
        let output = Command::new("tesseract")
            .arg(&image.path)
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .output()
            .with_context(|| format!("failed to execute tesseract for {}", image.path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract returned non-zero exit status for page {}: {}",
                image.page_number,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
    }
}
