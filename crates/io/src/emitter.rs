// OutputEmitter over the report and archive writers

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use retitle_recon::{ArchiveEntry, BatchReport, OutputEmitter};

use crate::{archive, report};

pub const DEFAULT_SHEET_NAME: &str = "Similarity Results";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ReportFormat::Xlsx),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unknown report format '{}' (expected xlsx or csv)", other)),
        }
    }
}

/// Produces report and archive bytes and, when output paths are set, writes
/// them to disk. Write failures surface through [`OutputEmitter`] so the
/// session can reopen review instead of losing the batch.
#[derive(Debug, Clone)]
pub struct FileEmitter {
    pub format: ReportFormat,
    pub sheet_name: String,
    report_path: Option<PathBuf>,
    archive_path: Option<PathBuf>,
}

impl Default for FileEmitter {
    fn default() -> Self {
        Self::new(ReportFormat::Xlsx, DEFAULT_SHEET_NAME)
    }
}

impl FileEmitter {
    pub fn new(format: ReportFormat, sheet_name: impl Into<String>) -> Self {
        Self { format, sheet_name: sheet_name.into(), report_path: None, archive_path: None }
    }

    pub fn with_output_paths(mut self, report: impl Into<PathBuf>, archive: impl Into<PathBuf>) -> Self {
        self.report_path = Some(report.into());
        self.archive_path = Some(archive.into());
        self
    }

    pub fn report_path(&self) -> Option<&Path> {
        self.report_path.as_deref()
    }

    pub fn archive_path(&self) -> Option<&Path> {
        self.archive_path.as_deref()
    }
}

fn persist(path: Option<&Path>, bytes: Vec<u8>) -> Result<Vec<u8>, String> {
    if let Some(path) = path {
        fs::write(path, &bytes).map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    }
    Ok(bytes)
}

impl OutputEmitter for FileEmitter {
    fn write_report(&self, report: &BatchReport) -> Result<Vec<u8>, String> {
        let bytes = match self.format {
            ReportFormat::Xlsx => report::write_xlsx(report, &self.sheet_name)?,
            ReportFormat::Csv => report::write_csv(report)?,
        };
        persist(self.report_path(), bytes)
    }

    fn package_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, String> {
        persist(self.archive_path(), archive::build_archive(entries)?)
    }
}
