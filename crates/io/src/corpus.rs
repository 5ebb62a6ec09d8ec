// Reference name list loading
//
// Accepted sources:
//   .txt (or anything unrecognized) - one name per line, '#' comments
//   .csv                            - first column of every record
//   .xlsx/.xlsm/.xls/.xlsb/.ods     - first column of the first sheet

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use retitle_recon::ReferenceCorpus;

use crate::text::read_file_as_utf8;

pub fn load_reference_list(path: &Path) -> Result<ReferenceCorpus, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let names = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_spreadsheet_names(path)?,
        "csv" => parse_csv_names(&read_file_as_utf8(path)?)?,
        _ => parse_text_names(&read_file_as_utf8(path)?),
    };

    log::debug!("corpus: {} names from {}", names.len(), path.display());
    Ok(ReferenceCorpus::new(names))
}

/// Non-blank, non-comment lines, trimmed. Duplicates are kept.
pub fn parse_text_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn parse_csv_names(content: &str) -> Result<Vec<String>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut names = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("CSV parse error at row {}: {}", i + 1, e))?;
        if let Some(first) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) {
            names.push(first.to_string());
        }
    }
    Ok(names)
}

fn read_spreadsheet_names(path: &Path) -> Result<Vec<String>, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| format!("{} has no sheets", path.display()))?;
    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| format!("Failed to read sheet '{}': {}", first, e))?;

    Ok(range
        .rows()
        .filter_map(|row| row.first())
        .filter_map(cell_text)
        .collect())
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
