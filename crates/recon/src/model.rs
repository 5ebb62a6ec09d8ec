use serde::Serialize;

use crate::normalize::normalize;

/// Fallback final name for documents whose file name normalizes to nothing.
pub const UNTITLED_NAME: &str = "untitled";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One file handed over by intake: name plus raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// A document as read at intake. Immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDocument {
    pub raw_name: String,
    /// Embedded title metadata; empty when absent or unreadable.
    pub raw_title: String,
}

impl InputDocument {
    /// Normalized original name, used as the matcher query.
    pub fn normalized_name(&self) -> String {
        normalize(&self.raw_name)
    }

    /// Final name used when the operator supplies none. Never empty: names
    /// such as `.pdf.pdf` normalize to nothing and fall back to
    /// [`UNTITLED_NAME`].
    pub fn default_name(&self) -> String {
        let name = self.normalized_name();
        if name.trim().is_empty() {
            UNTITLED_NAME.to_string()
        } else {
            name
        }
    }
}

/// The known document names ("master list"). Read-only to the engine.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCorpus {
    names: Vec<String>,
}

impl ReferenceCorpus {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ReferenceCorpus {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub reference_name: String,
    /// 0 = no similarity, 100 = identical after processing.
    pub score: u8,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Per-document decision state. Exactly one per input document, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationRecord {
    pub source: InputDocument,
    pub matches: Vec<MatchCandidate>,
    /// Operator-chosen subset of match names, in insertion order.
    pub selected: Vec<String>,
    pub final_name: String,
    pub final_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ReconciliationRecord {
    pub(crate) fn pending(source: InputDocument) -> Self {
        let default_name = source.default_name();
        Self {
            source,
            matches: Vec::new(),
            selected: Vec::new(),
            final_title: default_name.clone(),
            final_name: default_name,
            failure: None,
        }
    }

    pub(crate) fn failed(source: InputDocument, reason: String) -> Self {
        let mut record = Self::pending(source);
        record.failure = Some(reason);
        record
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s == name)
    }

    /// Score of a selected name, looked up in this record's matches.
    pub fn score_of(&self, name: &str) -> Option<u8> {
        self.matches
            .iter()
            .find(|m| m.reference_name == name)
            .map(|m| m.score)
    }

    pub(crate) fn mark_failed(&mut self, reason: String) {
        self.failure = Some(reason);
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub total: usize,
    pub failed: usize,
    /// Records whose final title differs from the original metadata title.
    pub title_changes: usize,
    /// Records whose final name differs from the normalized original name.
    pub name_changes: usize,
}

impl SessionSummary {
    pub fn from_records(records: &[ReconciliationRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };
        for r in records {
            if r.is_failed() {
                summary.failed += 1;
                continue;
            }
            if r.final_title != r.source.raw_title {
                summary.title_changes += 1;
            }
            if r.final_name != r.source.default_name() {
                summary.name_changes += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, title: &str) -> InputDocument {
        InputDocument {
            raw_name: name.into(),
            raw_title: title.into(),
        }
    }

    #[test]
    fn pending_record_defaults_to_normalized_name() {
        let r = ReconciliationRecord::pending(doc("q1_report.pdf", "Old"));
        assert_eq!(r.final_name, "q1_report");
        assert_eq!(r.final_title, "q1_report");
        assert!(!r.is_failed());
        assert!(r.selected.is_empty());
    }

    #[test]
    fn extension_only_name_defaults_to_untitled() {
        for raw in [".PDF.pdf", " .pdf", ".pdf.pdf"] {
            let r = ReconciliationRecord::pending(doc(raw, ""));
            assert_eq!(r.final_name, UNTITLED_NAME, "{raw}");
            assert_eq!(r.final_title, UNTITLED_NAME, "{raw}");
        }
    }

    #[test]
    fn summary_counts_changes_and_failures() {
        let mut renamed = ReconciliationRecord::pending(doc("a.pdf", "a"));
        renamed.final_name = "b".into();
        renamed.final_title = "b".into();
        let untouched = ReconciliationRecord::pending(doc("c.pdf", "c"));
        let retitled = ReconciliationRecord::pending(doc("d.pdf", ""));
        let failed = ReconciliationRecord::failed(doc("e.pdf", ""), "read error: bad".into());

        let s = SessionSummary::from_records(&[renamed, untouched, retitled, failed]);
        assert_eq!(s.total, 4);
        assert_eq!(s.failed, 1);
        assert_eq!(s.title_changes, 2);
        assert_eq!(s.name_changes, 1);
    }

    #[test]
    fn corpus_collects_from_strs() {
        let corpus: ReferenceCorpus = ["a", "b", "a"].into_iter().collect();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.names()[2], "a");
    }
}
