use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;

/// A rasterized page, backed by a temporary PNG on disk.
#[derive(Debug)]
pub struct PageImage {
    pub path: PathBuf,
    pub page_number: usize,
}

impl PageImage {
    pub fn cleanup(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub trait PageRasterizer {
    fn page_count(&self, pdf_path: &Path) -> Result<usize>;

    /// Renders one page at the given scale factor (1.0 = 72 dpi). Deterministic
    /// for a given (document, page, scale).
    fn rasterize(&self, pdf_path: &Path, page_number: usize, scale: f32) -> Result<PageImage>;
}

/// Poppler-backed rasterizer: pdfinfo for the page count, pdftoppm for page
/// images.
pub struct PopplerRasterizer;

impl PageRasterizer for PopplerRasterizer {
    fn page_count(&self, pdf_path: &Path) -> Result<usize> {
        let output = Command::new("pdfinfo")
            .arg(pdf_path)
            .output()
            .with_context(|| format!("failed to execute pdfinfo for {}", pdf_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "pdfinfo returned non-zero exit status for {}: {}",
                pdf_path.display(),
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            if let Some(rest) = line.strip_prefix("Pages:") {
                return rest.trim().parse::<usize>().with_context(|| {
                    format!(
                        "invalid page count in pdfinfo output for {}",
                        pdf_path.display()
                    )
                });
            }
        }

        bail!(
            "pdfinfo output for {} did not include a page count",
            pdf_path.display()
        );
    }

    fn rasterize(&self, pdf_path: &Path, page_number: usize, scale: f32) -> Result<PageImage> {
        let pdf_stem = pdf_path
            .file_stem()
            .and_then(|value| value.to_str())
            .unwrap_or("pdf");
        let safe_stem = pdf_stem
            .chars()
            .map(|character| {
                if character.is_ascii_alphanumeric() {
                    character
                } else {
                    '_'
                }
            })
            .collect::<String>();

        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let output_root = std::env::temp_dir().join(format!(
            "voterscan_page_{}_{}_{}_{}",
            safe_stem,
            std::process::id(),
            page_number,
            stamp
        ));
        let png_path = PathBuf::from(format!("{}.png", output_root.display()));

        let resolution = (72.0 * scale).round().max(1.0) as u32;

        let output = Command::new("pdftoppm")
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-r")
            .arg(resolution.to_string())
            .arg("-singlefile")
            .arg("-png")
            .arg(pdf_path)
            .arg(&output_root)
            .output()
            .with_context(|| format!("failed to execute pdftoppm for {}", pdf_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "pdftoppm returned non-zero exit status for {} page {}: {}",
                pdf_path.display(),
                page_number,
                stderr.trim()
            );
        }

        if !png_path.exists() {
            bail!(
                "pdftoppm did not produce expected image for {} page {}",
                pdf_path.display(),
                page_number
            );
        }

        Ok(PageImage {
            path: png_path,
            page_number,
        })
    }
}
