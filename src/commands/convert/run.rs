use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::ConvertArgs;
use crate::export::{render_preview, serialize_table};
use crate::model::{ConvertCounts, ConvertPaths, ConvertRunManifest, SourcePdf, ToolVersions};
use crate::ocr::TesseractOcr;
use crate::pdf::PopplerRasterizer;
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_bytes, write_json_pretty};

use super::pipeline::{CancelToken, ConversionOutcome, Converter};

pub fn run(args: ConvertArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    if !args.pdf.is_file() {
        bail!(
            "no input PDF at {}: select a voter-list PDF before starting",
            args.pdf.display()
        );
    }

    let output_path = args
        .out
        .clone()
        .unwrap_or_else(|| args.pdf.with_extension("csv"));
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.pdf
            .with_file_name(format!("convert_run_{}.json", utc_compact_string(started_ts)))
    });

    info!(pdf = %args.pdf.display(), run_id = %run_id, "starting conversion");

    let sha256 = sha256_file(&args.pdf)?;
    let tool_versions = collect_tool_versions();
    let mut warnings = Vec::new();

    let converter = Converter::new(
        PopplerRasterizer,
        TesseractOcr,
        args.scale,
        args.ocr_lang.clone(),
    )
    .with_max_pages(args.max_pages);
    let cancel = CancelToken::new();

    let outcome = converter.start(&args.pdf, &cancel)?;

    let mut counts = ConvertCounts::default();
    let mut written_output: Option<PathBuf> = None;

    let status = match outcome {
        ConversionOutcome::Stopped {
            pages_completed,
            page_count,
        } => {
            counts.page_count = page_count;
            counts.pages_ocr_completed = pages_completed;

            warn!(
                pages_completed,
                page_count, "conversion stopped before completion, nothing parsed"
            );
            "stopped"
        }
        ConversionOutcome::Completed {
            records,
            stats,
            page_count,
        } => {
            counts.page_count = page_count;
            counts.pages_ocr_completed = page_count;
            counts.anchors_detected = stats.anchors_detected;
            counts.migrated_skipped = stats.migrated_skipped;
            counts.records_extracted = stats.records_extracted;
            counts.records_retained = stats.records_retained;

            if records.is_empty() {
                warn!(
                    anchors = stats.anchors_detected,
                    "no data extracted: possible format mismatch or OCR breakdown"
                );
                warnings.push("no records detected in recognized text".to_string());
                "no_data"
            } else {
                if args.json {
                    let mut stdout = io::BufWriter::new(io::stdout().lock());
                    serde_json::to_writer_pretty(&mut stdout, &records)
                        .context("failed to serialize records json output")?;
                    writeln!(stdout)?;
                    stdout.flush()?;
                } else {
                    let table = serialize_table(&records)?;
                    write_bytes(&output_path, &table)?;
                    written_output = Some(output_path.clone());
                    info!(path = %output_path.display(), rows = records.len(), "wrote csv output");
                }

                if args.preview {
                    print!("{}", render_preview(&records));
                }

                "completed"
            }
        }
    };

    let manifest = ConvertRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: status.to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_convert_command(&args),
        tool_versions,
        source: SourcePdf {
            filename: args
                .pdf
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string(),
            sha256,
            page_count: counts.page_count,
        },
        paths: ConvertPaths {
            pdf_path: args.pdf.display().to_string(),
            output_path: written_output.map(|path| path.display().to_string()),
            manifest_path: manifest_path.display().to_string(),
        },
        counts,
        warnings,
    };

    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote convert run manifest");
    info!(
        status,
        progress = converter.progress_percent(),
        message = %converter.status_message(),
        pages = counts.pages_ocr_completed,
        records = counts.records_retained,
        "conversion finished"
    );

    Ok(())
}

fn collect_tool_versions() -> ToolVersions {
    ToolVersions {
        pdfinfo: command_version_optional("pdfinfo", &["-v"]),
        pdftoppm: command_version_optional("pdftoppm", &["-v"]),
        tesseract: command_version_optional("tesseract", &["--version"]),
    }
}

fn command_version_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}

fn render_convert_command(args: &ConvertArgs) -> String {
    let mut command = vec![
        "voterscan".to_string(),
        "convert".to_string(),
        "--pdf".to_string(),
        args.pdf.display().to_string(),
    ];

    if let Some(path) = &args.out {
        command.push("--out".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    command.push("--scale".to_string());
    command.push(args.scale.to_string());
    command.push("--ocr-lang".to_string());
    command.push(args.ocr_lang.clone());
    if let Some(max_pages) = args.max_pages {
        command.push("--max-pages".to_string());
        command.push(max_pages.to_string());
    }
    if args.preview {
        command.push("--preview".to_string());
    }
    if args.json {
        command.push("--json".to_string());
    }

    command.join(" ")
}
