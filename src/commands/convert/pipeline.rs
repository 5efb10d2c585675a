use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::info;

use crate::model::Record;
use crate::ocr::OcrEngine;
use crate::parse::{ParseStats, parse_records};
use crate::pdf::PageRasterizer;

/// Cooperative cancellation, honored only at page boundaries. A token is
/// created per run, so concurrent or successive runs cannot interfere.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    stop_requested: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum ConversionOutcome {
    /// All pages processed and the buffer parsed. An empty record list is the
    /// distinct "no data" condition, not a failure.
    Completed {
        records: Vec<Record>,
        stats: ParseStats,
        page_count: usize,
    },
    /// Stop honored before a page started. Nothing is parsed on stop.
    Stopped {
        pages_completed: usize,
        page_count: usize,
    },
}

/// Drives rasterize + OCR page by page, strictly sequential, then hands the
/// accumulated text to the record grammar.
pub struct Converter<R, O> {
    rasterizer: R,
    ocr: O,
    scale: f32,
    lang: String,
    max_pages: Option<usize>,
    progress: Arc<AtomicU8>,
    status: Arc<Mutex<String>>,
}

impl<R: PageRasterizer, O: OcrEngine> Converter<R, O> {
    pub fn new(rasterizer: R, ocr: O, scale: f32, lang: impl Into<String>) -> Self {
        Self {
            rasterizer,
            ocr,
            scale,
            lang: lang.into(),
            max_pages: None,
            progress: Arc::new(AtomicU8::new(0)),
            status: Arc::new(Mutex::new(String::new())),
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn status_message(&self) -> String {
        self.status
            .lock()
            .map(|message| message.clone())
            .unwrap_or_default()
    }

    /// Runs one conversion. Progress and status reset at entry, so a
    /// converter can be reused after a completed, stopped, or failed run as
    /// long as each run gets its own token. Any rasterize/OCR error discards
    /// the partial buffer and surfaces as a failure.
    pub fn start(&self, pdf_path: &Path, cancel: &CancelToken) -> Result<ConversionOutcome> {
        match self.run_pipeline(pdf_path, cancel) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.progress.store(0, Ordering::SeqCst);
                self.set_status("Conversion failed.");
                Err(err)
            }
        }
    }

    fn run_pipeline(&self, pdf_path: &Path, cancel: &CancelToken) -> Result<ConversionOutcome> {
        self.progress.store(0, Ordering::SeqCst);
        self.set_status("Loading PDF...");

        let mut page_count = self.rasterizer.page_count(pdf_path)?;
        if let Some(max_pages) = self.max_pages {
            page_count = page_count.min(max_pages);
        }

        info!(pages = page_count, "document loaded, starting OCR");

        let mut buffer = String::new();
        let mut pages_completed = 0;

        for page_number in 1..=page_count {
            if cancel.is_stop_requested() {
                info!(page = page_number, "stop requested, halting at page boundary");
                self.set_status(format!(
                    "Stopped after page {pages_completed}/{page_count}."
                ));

                return Ok(ConversionOutcome::Stopped {
                    pages_completed,
                    page_count,
                });
            }

            // Progress reflects pages completed so far, so page 1 reports 0%.
            self.progress
                .store(page_progress_percent(page_number, page_count), Ordering::SeqCst);
            self.set_status(format!("OCR page {page_number}/{page_count}..."));

            let image = self.rasterizer.rasterize(pdf_path, page_number, self.scale)?;
            let recognized = self.ocr.recognize(&image, &self.lang);
            image.cleanup();

            buffer.push('\n');
            buffer.push_str(&recognized?);
            pages_completed = page_number;
        }

        self.progress.store(95, Ordering::SeqCst);
        self.set_status("Parsing records...");

        let outcome = parse_records(&buffer)?;

        if outcome.records.is_empty() {
            self.progress.store(0, Ordering::SeqCst);
            self.set_status("No data extracted. Possible format mismatch or OCR breakdown.");
        } else {
            self.progress.store(100, Ordering::SeqCst);
            self.set_status(format!("Done. {} records extracted.", outcome.records.len()));
        }

        Ok(ConversionOutcome::Completed {
            records: outcome.records,
            stats: outcome.stats,
            page_count,
        })
    }

    fn set_status(&self, message: impl Into<String>) {
        if let Ok(mut status) = self.status.lock() {
            *status = message.into();
        }
    }
}

fn page_progress_percent(page_number: usize, page_count: usize) -> u8 {
    if page_count == 0 {
        return 0;
    }

    (((page_number - 1) as f64 / page_count as f64) * 100.0).round() as u8
}
