use anyhow::{Context, Result};
use regex::Regex;

/// Blocks whose joined text contains this token describe voters moved to
/// another list; they are dropped before field extraction.
pub const MIGRATED_MARKER: &str = "মাইগ্রেট";

/// The contiguous run of trimmed, non-empty lines belonging to one detected
/// record, from its anchor line (inclusive) to the next anchor (exclusive).
#[derive(Debug, Clone)]
pub struct RecordBlock {
    pub serial: u32,
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Segmentation {
    pub blocks: Vec<RecordBlock>,
    pub anchors_detected: usize,
    pub migrated_skipped: usize,
}

#[derive(Debug)]
pub struct RecordSegmenter {
    anchor: Regex,
}

impl RecordSegmenter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor: Regex::new(r"^\s*(\d{4})\.\s*নাম:\s*(.+)$")
                .context("failed to compile record anchor regex")?,
        })
    }

    /// Partitions normalized document text into per-record blocks. Blank
    /// lines are dropped before any position bookkeeping, so they never count
    /// toward block boundaries. No anchors means an empty result, not an
    /// error.
    pub fn segment(&self, text: &str) -> Segmentation {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut anchors = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if let Some((serial, name)) = self.detect_anchor(line) {
                anchors.push((index, serial, name));
            }
        }

        let mut segmentation = Segmentation {
            anchors_detected: anchors.len(),
            ..Segmentation::default()
        };

        for (position, (start, serial, name)) in anchors.iter().enumerate() {
            let end = anchors
                .get(position + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(lines.len());

            let block_lines: Vec<String> = lines[*start..end]
                .iter()
                .map(|line| (*line).to_string())
                .collect();

            if block_lines.join("\n").contains(MIGRATED_MARKER) {
                segmentation.migrated_skipped += 1;
                continue;
            }

            segmentation.blocks.push(RecordBlock {
                serial: *serial,
                name: name.clone(),
                lines: block_lines,
            });
        }

        segmentation
    }

    /// A record-start anchor is a 4-digit serial, a period, then the name
    /// label. Leading zeros in the serial are allowed.
    fn detect_anchor(&self, line: &str) -> Option<(u32, String)> {
        let captures = self.anchor.captures(line)?;
        let serial = captures.get(1)?.as_str().parse::<u32>().ok()?;
        let name = captures.get(2)?.as_str().trim().to_string();

        Some((serial, name))
    }
}
