use std::fmt::Write as _;

use anyhow::{Context, Result, anyhow};

use crate::model::Record;

/// Exposed column order is fixed; downstream consumers rely on it.
pub const COLUMN_HEADERS: [&str; 8] = [
    "Serial",
    "নাম",
    "ভোটার নং",
    "পিতা",
    "মাতা",
    "পেশা",
    "জন্ম তারিখ",
    "ঠিকানা",
];

pub const PREVIEW_ROW_LIMIT: usize = 50;

pub fn serialize_table(records: &[Record]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(COLUMN_HEADERS)
        .context("failed to write csv header")?;

    for record in records {
        writer
            .write_record([
                record.serial.to_string().as_str(),
                record.name.as_str(),
                record.voter_number.as_str(),
                record.father_name.as_str(),
                record.mother_name.as_str(),
                record.occupation.as_str(),
                record.birth_date.as_str(),
                record.address.as_str(),
            ])
            .with_context(|| format!("failed to write csv row for serial {}", record.serial))?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow!("failed to finalize csv buffer: {err}"))
}

/// On-screen preview: the first rows tab-separated, with a footer naming the
/// total row count.
pub fn render_preview(records: &[Record]) -> String {
    if records.is_empty() {
        return "No data to preview.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&COLUMN_HEADERS.join("\t"));
    out.push('\n');

    let shown = records.len().min(PREVIEW_ROW_LIMIT);
    for record in &records[..shown] {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.serial,
            record.name,
            record.voter_number,
            record.father_name,
            record.mother_name,
            record.occupation,
            record.birth_date,
            record.address
        );
    }

    let _ = writeln!(out, "Preview showing first {} rows of {}.", shown, records.len());

    out
}
