use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ParseArgs;
use crate::export::{render_preview, serialize_table};
use crate::parse::parse_records;
use crate::util::write_bytes;

/// Offline half of the pipeline: run the record grammar over text that was
/// already recognized elsewhere. Useful for reparsing a bad OCR dump without
/// redoing the OCR.
pub fn run(args: ParseArgs) -> Result<()> {
    let raw_text = fs::read_to_string(&args.text)
        .with_context(|| format!("failed to read {}", args.text.display()))?;

    let outcome = parse_records(&raw_text)?;

    info!(
        anchors = outcome.stats.anchors_detected,
        migrated_skipped = outcome.stats.migrated_skipped,
        extracted = outcome.stats.records_extracted,
        retained = outcome.stats.records_retained,
        "parse completed"
    );

    if outcome.records.is_empty() {
        warn!(path = %args.text.display(), "no records detected");
    }

    if args.json {
        let mut stdout = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut stdout, &outcome.records)
            .context("failed to serialize records json output")?;
        writeln!(stdout)?;
        stdout.flush()?;
    } else if let Some(out) = &args.out {
        let table = serialize_table(&outcome.records)?;
        write_bytes(out, &table)?;
        info!(path = %out.display(), rows = outcome.records.len(), "wrote csv output");
    }

    if args.preview {
        print!("{}", render_preview(&outcome.records));
    }

    Ok(())
}
