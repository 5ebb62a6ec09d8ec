use serde::Serialize;

use crate::model::ReconciliationRecord;

/// Column headers, in the order consumers expect.
pub const REPORT_COLUMNS: [&str; 6] = [
    "Original Filename",
    "Original Metadata Title",
    "New Filename",
    "Selected Similar Files",
    "Selected Similarity Scores",
    "Failure Reason",
];

/// One audit line per input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub original_filename: String,
    pub original_title: String,
    pub new_filename: String,
    pub selected_names: String,
    pub selected_scores: String,
    pub failure_reason: String,
}

impl ReportRow {
    pub fn from_record(record: &ReconciliationRecord) -> Self {
        let selected_scores = record
            .selected
            .iter()
            .filter_map(|name| record.score_of(name))
            .map(|score| format!("{score}%"))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            original_filename: record.source.raw_name.clone(),
            original_title: record.source.raw_title.clone(),
            new_filename: if record.is_failed() {
                String::new()
            } else {
                record.final_name.clone()
            },
            selected_names: record.selected.join(", "),
            selected_scores,
            failure_reason: record.failure.clone().unwrap_or_default(),
        }
    }

    /// Cells in `REPORT_COLUMNS` order.
    pub fn cells(&self) -> [&str; 6] {
        [
            self.original_filename.as_str(),
            self.original_title.as_str(),
            self.new_filename.as_str(),
            self.selected_names.as_str(),
            self.selected_scores.as_str(),
            self.failure_reason.as_str(),
        ]
    }
}

/// Write-once view over every record, built at finalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub rows: Vec<ReportRow>,
}

impl BatchReport {
    pub fn build(records: &[ReconciliationRecord]) -> Self {
        Self {
            rows: records.iter().map(ReportRow::from_record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InputDocument, MatchCandidate};

    fn record(name: &str) -> ReconciliationRecord {
        ReconciliationRecord::pending(InputDocument {
            raw_name: name.into(),
            raw_title: "Old Title".into(),
        })
    }

    fn candidate(name: &str, score: u8) -> MatchCandidate {
        MatchCandidate {
            reference_name: name.into(),
            score,
        }
    }

    #[test]
    fn row_joins_selection_in_insertion_order() {
        let mut r = record("annual_report_2023.pdf");
        r.matches = vec![candidate("annual_report_2023", 100), candidate("ar2023_en_book", 60)];
        r.selected = vec!["ar2023_en_book".into(), "annual_report_2023".into()];

        let row = ReportRow::from_record(&r);
        assert_eq!(row.original_filename, "annual_report_2023.pdf");
        assert_eq!(row.original_title, "Old Title");
        assert_eq!(row.new_filename, "annual_report_2023");
        assert_eq!(row.selected_names, "ar2023_en_book, annual_report_2023");
        assert_eq!(row.selected_scores, "60%, 100%");
        assert_eq!(row.failure_reason, "");
    }

    #[test]
    fn failed_row_carries_reason_and_no_new_name() {
        let mut r = record("broken.pdf");
        r.mark_failed("read error: document is encrypted".into());
        let row = ReportRow::from_record(&r);
        assert_eq!(row.new_filename, "");
        assert_eq!(row.failure_reason, "read error: document is encrypted");
    }

    #[test]
    fn cells_follow_column_order() {
        let row = ReportRow::from_record(&record("x.pdf"));
        let cells = row.cells();
        assert_eq!(cells.len(), REPORT_COLUMNS.len());
        assert_eq!(cells[0], "x.pdf");
        assert_eq!(cells[2], "x");
        assert_eq!(REPORT_COLUMNS[4], "Selected Similarity Scores");
    }
}
