//! Boundaries to the external collaborators. The engine never parses a
//! document format or serializes an output file itself.

use crate::error::DocumentError;
use crate::report::BatchReport;

/// Reads and rewrites a document's title metadata as opaque byte transforms.
pub trait TitleStore {
    /// Current title; empty when the document has none.
    fn read_title(&self, content: &[u8]) -> Result<String, DocumentError>;

    /// New document bytes carrying `title`.
    fn write_title(&self, content: &[u8], title: &str) -> Result<Vec<u8>, DocumentError>;
}

/// A finalized file destined for the output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: Vec<u8>,
}

/// Packages finalized files and renders the audit report.
pub trait OutputEmitter {
    fn write_report(&self, report: &BatchReport) -> Result<Vec<u8>, String>;

    fn package_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, String>;
}
