use anyhow::Result;
use serde::Serialize;

use crate::model::Record;

mod digits;
mod extract;
mod segment;

pub use digits::normalize_digits;
pub use extract::extract_record;
pub use segment::{MIGRATED_MARKER, RecordBlock, RecordSegmenter, Segmentation};

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ParseStats {
    pub anchors_detected: usize,
    pub migrated_skipped: usize,
    pub records_extracted: usize,
    pub records_retained: usize,
}

#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<Record>,
    pub stats: ParseStats,
}

/// Runs the full grammar over recognized document text: digit normalization,
/// block segmentation, field extraction, then retention filtering and an
/// ascending sort by serial. Equal serials keep their detection order.
pub fn parse_records(raw_text: &str) -> Result<ParseOutcome> {
    let text = normalize_digits(raw_text);

    let segmenter = RecordSegmenter::new()?;
    let segmentation = segmenter.segment(&text);

    let mut records: Vec<Record> = segmentation.blocks.iter().map(extract_record).collect();
    let records_extracted = records.len();

    records.retain(Record::has_substance);
    records.sort_by_key(|record| record.serial);

    Ok(ParseOutcome {
        stats: ParseStats {
            anchors_detected: segmentation.anchors_detected,
            migrated_skipped: segmentation.migrated_skipped,
            records_extracted,
            records_retained: records.len(),
        },
        records,
    })
}
