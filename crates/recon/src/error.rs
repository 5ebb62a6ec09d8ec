use std::fmt;

use crate::session::SessionState;

/// Batch- and session-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Zero eligible input documents. Not fatal: the session stays idle.
    EmptyBatch,
    /// Operation attempted in a state that does not allow it.
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    /// Toggled name is not among the current record's matches.
    UnknownMatch(String),
    /// Match index out of range for the current record.
    MatchIndex { index: usize, len: usize },
    /// Archive or report generation failed for the whole batch.
    Emit(String),
    /// Policy / settings validation error.
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBatch => write!(f, "no eligible PDF documents in batch"),
            Self::InvalidState { operation, state } => {
                write!(f, "cannot {operation} while session is {state}")
            }
            Self::UnknownMatch(name) => {
                write!(f, "'{name}' is not a match for the current document")
            }
            Self::MatchIndex { index, len } => {
                write!(f, "match index {index} out of range ({len} match(es))")
            }
            Self::Emit(msg) => write!(f, "output generation failed: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

/// Per-document metadata failure. Converted into a failed record, never
/// propagated past the document boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Metadata unreadable, encrypted or corrupt.
    Read(String),
    /// Re-serialization with the new title failed.
    Write(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(msg) => write!(f, "read error: {msg}"),
            Self::Write(msg) => write!(f, "write error: {msg}"),
        }
    }
}

impl std::error::Error for DocumentError {}
