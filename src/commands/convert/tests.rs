use std::path::Path;

use anyhow::{Result, bail};

use super::*;
use crate::ocr::OcrEngine;
use crate::pdf::{PageImage, PageRasterizer};

struct FakeRasterizer {
    pages: usize,
}

impl PageRasterizer for FakeRasterizer {
    fn page_count(&self, _pdf_path: &Path) -> Result<usize> {
        Ok(self.pages)
    }

    fn rasterize(&self, _pdf_path: &Path, page_number: usize, _scale: f32) -> Result<PageImage> {
        Ok(PageImage {
            path: std::env::temp_dir().join(format!("voterscan_fake_{page_number}.png")),
            page_number,
        })
    }
}

struct FakeOcr {
    page_texts: Vec<&'static str>,
}

impl OcrEngine for FakeOcr {
    fn recognize(&self, image: &PageImage, _lang: &str) -> Result<String> {
        Ok(self
            .page_texts
            .get(image.page_number - 1)
            .copied()
            .unwrap_or_default()
            .to_string())
    }
}

/// Requests a stop through the run's token once a given page has been
/// recognized, simulating a user pressing stop mid-run.
struct StoppingOcr {
    stop_after_page: usize,
    cancel: CancelToken,
}

impl OcrEngine for StoppingOcr {
    fn recognize(&self, image: &PageImage, _lang: &str) -> Result<String> {
        if image.page_number == self.stop_after_page {
            self.cancel.request_stop();
        }

        Ok(format!("000{}. নাম: Page Voter\nভোটার নং: 1\n", image.page_number))
    }
}

struct FailingOcr {
    fail_on_page: usize,
}

impl OcrEngine for FailingOcr {
    fn recognize(&self, image: &PageImage, _lang: &str) -> Result<String> {
        if image.page_number == self.fail_on_page {
            bail!("simulated engine failure on page {}", image.page_number);
        }

        Ok("0001. নাম: X\nভোটার নং: 1\n".to_string())
    }
}

#[test]
fn completed_run_parses_accumulated_pages_and_reports_full_progress() {
    let converter = Converter::new(
        FakeRasterizer { pages: 2 },
        FakeOcr {
            page_texts: vec![
                "0012. নাম: Later Voter\nভোটার নং: 222",
                "0003. নাম: Earlier Voter\nপিতা: Abdul",
            ],
        },
        2.0,
        "ben",
    );

    let outcome = converter
        .start(Path::new("fixture.pdf"), &CancelToken::new())
        .expect("conversion succeeds");

    match outcome {
        ConversionOutcome::Completed {
            records,
            stats,
            page_count,
        } => {
            assert_eq!(page_count, 2);
            assert_eq!(stats.records_retained, 2);
            let serials: Vec<u32> = records.iter().map(|record| record.serial).collect();
            assert_eq!(serials, vec![3, 12]);
        }
        other => panic!("expected completed outcome, got {other:?}"),
    }

    assert_eq!(converter.progress_percent(), 100);
    assert!(converter.status_message().contains("Done"));
}

#[test]
fn record_split_across_a_page_boundary_stays_one_block() {
    let converter = Converter::new(
        FakeRasterizer { pages: 2 },
        FakeOcr {
            page_texts: vec!["0007. নাম: Karim Uddin", "ভোটার নং: 123456"],
        },
        2.0,
        "ben",
    );

    let outcome = converter
        .start(Path::new("fixture.pdf"), &CancelToken::new())
        .expect("conversion succeeds");

    let ConversionOutcome::Completed { records, .. } = outcome else {
        panic!("expected completed outcome");
    };

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].serial, 7);
    assert_eq!(records[0].voter_number, "123456");
}

#[test]
fn stop_after_page_two_of_five_halts_at_the_next_boundary() {
    let cancel = CancelToken::new();
    let converter = Converter::new(
        FakeRasterizer { pages: 5 },
        StoppingOcr {
            stop_after_page: 2,
            cancel: cancel.clone(),
        },
        2.0,
        "ben",
    );

    let outcome = converter
        .start(Path::new("fixture.pdf"), &cancel)
        .expect("stopped run is not an error");

    match outcome {
        ConversionOutcome::Stopped {
            pages_completed,
            page_count,
        } => {
            assert_eq!(pages_completed, 2);
            assert_eq!(page_count, 5);
        }
        other => panic!("expected stopped outcome, got {other:?}"),
    }

    // Progress was last reported before page 2: round(1/5 * 100).
    assert_eq!(converter.progress_percent(), 20);
    assert!(converter.status_message().contains("Stopped after page 2/5"));
}

#[test]
fn stop_requested_before_start_halts_before_page_one() {
    let cancel = CancelToken::new();
    cancel.request_stop();

    let converter = Converter::new(
        FakeRasterizer { pages: 3 },
        FakeOcr { page_texts: vec![] },
        2.0,
        "ben",
    );

    let outcome = converter
        .start(Path::new("fixture.pdf"), &cancel)
        .expect("stopped run is not an error");

    let ConversionOutcome::Stopped { pages_completed, .. } = outcome else {
        panic!("expected stopped outcome");
    };
    assert_eq!(pages_completed, 0);
}

#[test]
fn fresh_token_on_a_later_run_is_unaffected_by_an_earlier_stop() {
    let spent = CancelToken::new();
    spent.request_stop();

    let converter = Converter::new(
        FakeRasterizer { pages: 1 },
        FakeOcr {
            page_texts: vec!["0001. নাম: X\nভোটার নং: 1"],
        },
        2.0,
        "ben",
    );

    let first = converter
        .start(Path::new("fixture.pdf"), &spent)
        .expect("stopped run is not an error");
    assert!(matches!(first, ConversionOutcome::Stopped { .. }));

    let second = converter
        .start(Path::new("fixture.pdf"), &CancelToken::new())
        .expect("second run succeeds");
    assert!(matches!(second, ConversionOutcome::Completed { .. }));
    assert_eq!(converter.progress_percent(), 100);
}

#[test]
fn engine_failure_discards_the_run_and_resets_progress() {
    let converter = Converter::new(
        FakeRasterizer { pages: 3 },
        FailingOcr { fail_on_page: 2 },
        2.0,
        "ben",
    );

    let err = converter
        .start(Path::new("fixture.pdf"), &CancelToken::new())
        .expect_err("page 2 failure propagates");

    assert!(err.to_string().contains("simulated engine failure"));
    assert_eq!(converter.progress_percent(), 0);
    assert_eq!(converter.status_message(), "Conversion failed.");
}

#[test]
fn empty_recognition_completes_with_the_distinct_no_data_status() {
    let converter = Converter::new(
        FakeRasterizer { pages: 2 },
        FakeOcr {
            page_texts: vec!["", "smudges only, no anchors"],
        },
        2.0,
        "ben",
    );

    let outcome = converter
        .start(Path::new("fixture.pdf"), &CancelToken::new())
        .expect("empty result is not a failure");

    let ConversionOutcome::Completed { records, stats, .. } = outcome else {
        panic!("expected completed outcome");
    };

    assert!(records.is_empty());
    assert_eq!(stats.anchors_detected, 0);
    assert_eq!(converter.progress_percent(), 0);
    assert!(converter.status_message().contains("No data extracted"));
}

#[test]
fn max_pages_caps_the_page_loop() {
    let converter = Converter::new(
        FakeRasterizer { pages: 10 },
        FakeOcr {
            page_texts: vec!["0001. নাম: X\nভোটার নং: 1"; 10],
        },
        2.0,
        "ben",
    )
    .with_max_pages(Some(3));

    let outcome = converter
        .start(Path::new("fixture.pdf"), &CancelToken::new())
        .expect("conversion succeeds");

    let ConversionOutcome::Completed { page_count, .. } = outcome else {
        panic!("expected completed outcome");
    };
    assert_eq!(page_count, 3);
}
