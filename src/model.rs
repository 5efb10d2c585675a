use serde::{Deserialize, Serialize};

/// One extracted voter-list row. Free-text fields stay empty when the
/// corresponding labeled line is absent from the record block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub serial: u32,
    pub name: String,
    pub voter_number: String,
    pub father_name: String,
    pub mother_name: String,
    pub occupation: String,
    pub birth_date: String,
    pub address: String,
}

impl Record {
    /// Retention rule: serial and name alone are not enough to keep a record,
    /// at least one body field must have been recognized.
    pub fn has_substance(&self) -> bool {
        !self.voter_number.is_empty()
            || !self.father_name.is_empty()
            || !self.mother_name.is_empty()
            || !self.address.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolVersions {
    pub pdfinfo: Option<String>,
    pub pdftoppm: Option<String>,
    pub tesseract: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcePdf {
    pub filename: String,
    pub sha256: String,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertPaths {
    pub pdf_path: String,
    pub output_path: Option<String>,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ConvertCounts {
    pub page_count: usize,
    pub pages_ocr_completed: usize,
    pub anchors_detected: usize,
    pub migrated_skipped: usize,
    pub records_extracted: usize,
    pub records_retained: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub tool_versions: ToolVersions,
    pub source: SourcePdf,
    pub paths: ConvertPaths,
    pub counts: ConvertCounts,
    pub warnings: Vec<String>,
}
