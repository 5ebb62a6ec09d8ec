//! Batch reconciliation controller.
//!
//! One session walks a batch of documents: intake reads titles, `initialize`
//! computes matches once, the operator reviews record by record, and
//! `finalize` hands renamed files and the audit report to the emitter.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::adapter::{ArchiveEntry, OutputEmitter, TitleStore};
use crate::config::MatchPolicy;
use crate::error::ReconError;
use crate::matcher::extract;
use crate::model::{InputDocument, ReconciliationRecord, ReferenceCorpus, SessionSummary, SourceFile};
use crate::report::BatchReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Initializing,
    Reviewing,
    Finalizing,
    Done,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Reviewing => write!(f, "reviewing"),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Result of committing the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Record committed; cursor unchanged.
    Committed,
    /// Last record committed; session is now `Finalizing`.
    ReadyToFinalize,
}

/// Artifacts produced by a successful finalization.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub archive: Vec<u8>,
    pub report: Vec<u8>,
    /// Names of the files placed in the archive, in input order.
    pub archived: Vec<String>,
    pub rows: BatchReport,
    pub summary: SessionSummary,
}

pub struct ReconSession {
    policy: MatchPolicy,
    corpus: ReferenceCorpus,
    records: Vec<ReconciliationRecord>,
    /// Document bytes, parallel to `records`.
    contents: Vec<Vec<u8>>,
    cursor: usize,
    edit_buffer: String,
    state: SessionState,
}

impl ReconSession {
    /// Intake: read every document's title. Unreadable documents become
    /// failed records; the batch always keeps input cardinality and order.
    pub fn open(
        files: Vec<SourceFile>,
        corpus: ReferenceCorpus,
        policy: MatchPolicy,
        store: &impl TitleStore,
    ) -> Self {
        let mut records = Vec::with_capacity(files.len());
        let mut contents = Vec::with_capacity(files.len());

        for file in files {
            let record = match store.read_title(&file.content) {
                Ok(title) => {
                    log::debug!("read '{}': title {:?}", file.name, title);
                    ReconciliationRecord::pending(InputDocument {
                        raw_name: file.name,
                        raw_title: title,
                    })
                }
                Err(e) => {
                    log::warn!("cannot read '{}': {e}", file.name);
                    ReconciliationRecord::failed(
                        InputDocument {
                            raw_name: file.name,
                            raw_title: String::new(),
                        },
                        e.to_string(),
                    )
                }
            };
            records.push(record);
            contents.push(file.content);
        }

        Self {
            policy,
            corpus,
            records,
            contents,
            cursor: 0,
            edit_buffer: String::new(),
            state: SessionState::Initializing,
        }
    }

    /// Compute matches for every readable document and start reviewing.
    /// Runs once per batch; later calls are rejected.
    pub fn initialize(&mut self) -> Result<(), ReconError> {
        self.require(SessionState::Initializing, "initialize")?;
        if self.records.is_empty() {
            return Err(ReconError::EmptyBatch);
        }

        for record in self.records.iter_mut().filter(|r| !r.is_failed()) {
            let query = record.source.normalized_name();
            record.matches = extract(&query, &self.corpus, &self.policy);
            log::debug!(
                "'{}': {} match(es) at cutoff {}",
                record.source.raw_name,
                record.matches.len(),
                self.policy.cutoff
            );
        }

        self.cursor = 0;
        self.load_edit_buffer();
        self.state = SessionState::Reviewing;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn records(&self) -> &[ReconciliationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn current(&self) -> Option<&ReconciliationRecord> {
        self.records.get(self.cursor)
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.records.len()
    }

    pub fn edit_buffer(&self) -> &str {
        &self.edit_buffer
    }

    /// Documents that failed so far, as (name, reason).
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.records
            .iter()
            .filter_map(|r| {
                r.failure
                    .as_deref()
                    .map(|reason| (r.source.raw_name.as_str(), reason))
            })
            .collect()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_records(&self.records)
    }

    // -----------------------------------------------------------------------
    // Review
    // -----------------------------------------------------------------------

    /// Move to the next record; no-op on the last one.
    pub fn next(&mut self) -> Result<(), ReconError> {
        self.require(SessionState::Reviewing, "navigate")?;
        if self.cursor + 1 < self.records.len() {
            self.cursor += 1;
            self.load_edit_buffer();
        }
        Ok(())
    }

    /// Move to the previous record; no-op on the first one.
    pub fn previous(&mut self) -> Result<(), ReconError> {
        self.require(SessionState::Reviewing, "navigate")?;
        if self.cursor > 0 {
            self.cursor -= 1;
            self.load_edit_buffer();
        }
        Ok(())
    }

    /// Add or remove `name` from the current record's selection.
    /// Returns whether the name is selected afterwards.
    pub fn toggle_selection(&mut self, name: &str) -> Result<bool, ReconError> {
        self.require(SessionState::Reviewing, "toggle selection")?;
        let record = &mut self.records[self.cursor];
        if !record.matches.iter().any(|m| m.reference_name == name) {
            return Err(ReconError::UnknownMatch(name.to_string()));
        }
        if let Some(pos) = record.selected.iter().position(|s| s == name) {
            record.selected.remove(pos);
            Ok(false)
        } else {
            record.selected.push(name.to_string());
            Ok(true)
        }
    }

    /// Toggle the current record's match at `index`.
    pub fn toggle_match(&mut self, index: usize) -> Result<bool, ReconError> {
        self.require(SessionState::Reviewing, "toggle selection")?;
        let matches = &self.records[self.cursor].matches;
        let name = matches
            .get(index)
            .map(|m| m.reference_name.clone())
            .ok_or(ReconError::MatchIndex {
                index,
                len: matches.len(),
            })?;
        self.toggle_selection(&name)
    }

    pub fn set_edit_buffer(&mut self, value: impl Into<String>) -> Result<(), ReconError> {
        self.require(SessionState::Reviewing, "edit name")?;
        self.edit_buffer = value.into();
        Ok(())
    }

    /// Reset the edit buffer to the normalized original file name.
    pub fn use_original_name(&mut self) -> Result<(), ReconError> {
        self.require(SessionState::Reviewing, "edit name")?;
        self.edit_buffer = self.records[self.cursor].source.default_name();
        Ok(())
    }

    /// Copy the embedded metadata title into the edit buffer, if there is one.
    pub fn use_metadata_title(&mut self) -> Result<(), ReconError> {
        self.require(SessionState::Reviewing, "edit name")?;
        let title = &self.records[self.cursor].source.raw_title;
        if !title.trim().is_empty() {
            self.edit_buffer = title.clone();
        }
        Ok(())
    }

    /// Commit the edit buffer into the current record. Does not move the
    /// cursor; committing the last record moves the session to `Finalizing`.
    pub fn confirm(&mut self) -> Result<ConfirmOutcome, ReconError> {
        self.require(SessionState::Reviewing, "confirm")?;
        let record = &mut self.records[self.cursor];
        if !record.is_failed() {
            let edited = self.edit_buffer.trim();
            let name = if edited.is_empty() {
                record.source.default_name()
            } else {
                edited.to_string()
            };
            record.final_title = name.clone();
            record.final_name = name;
            self.edit_buffer = record.final_name.clone();
        }

        if self.is_last() {
            self.state = SessionState::Finalizing;
            Ok(ConfirmOutcome::ReadyToFinalize)
        } else {
            Ok(ConfirmOutcome::Committed)
        }
    }

    // -----------------------------------------------------------------------
    // Finalization
    // -----------------------------------------------------------------------

    /// Rewrite titles, build the report and package the archive.
    ///
    /// Per-document write failures mark the record failed and drop it from
    /// the archive. An emitter failure aborts the whole step and returns the
    /// session to `Reviewing` so the operator can retry.
    pub fn finalize(
        &mut self,
        store: &impl TitleStore,
        emitter: &impl OutputEmitter,
    ) -> Result<BatchOutput, ReconError> {
        self.require(SessionState::Finalizing, "finalize")?;

        let mut entries = Vec::new();
        let mut used_names = HashSet::new();
        for (record, content) in self.records.iter_mut().zip(&self.contents) {
            if record.is_failed() {
                continue;
            }
            match store.write_title(content, &record.final_title) {
                Ok(bytes) => {
                    let name = unique_entry_name(&record.final_name, &mut used_names);
                    log::debug!("'{}' -> '{name}'", record.source.raw_name);
                    entries.push(ArchiveEntry {
                        name,
                        content: bytes,
                    });
                }
                Err(e) => {
                    log::warn!("cannot retitle '{}': {e}", record.source.raw_name);
                    record.mark_failed(e.to_string());
                }
            }
        }

        let rows = BatchReport::build(&self.records);
        let emitted = emitter
            .write_report(&rows)
            .and_then(|report| emitter.package_archive(&entries).map(|archive| (report, archive)));

        match emitted {
            Ok((report, archive)) => {
                self.state = SessionState::Done;
                Ok(BatchOutput {
                    archive,
                    report,
                    archived: entries.into_iter().map(|e| e.name).collect(),
                    rows,
                    summary: self.summary(),
                })
            }
            Err(msg) => {
                log::warn!("output generation failed: {msg}");
                self.state = SessionState::Reviewing;
                Err(ReconError::Emit(msg))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), ReconError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ReconError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn load_edit_buffer(&mut self) {
        self.edit_buffer = self
            .records
            .get(self.cursor)
            .map(|r| r.final_name.clone())
            .unwrap_or_default();
    }
}

/// `<name>.pdf`, suffixed ` (2)`, ` (3)`, ... when already taken.
fn unique_entry_name(name: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = format!("{name}.pdf");
    let mut n = 2;
    while !used.insert(candidate.to_lowercase()) {
        candidate = format!("{name} ({n}).pdf");
        n += 1;
    }
    candidate
}
