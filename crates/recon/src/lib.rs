//! `retitle-recon`: fuzzy name reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded documents and a reference list,
//! proposes matches and tracks operator decisions. Document formats, archives
//! and reports are reached through the traits in [`adapter`].

pub mod adapter;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;
pub mod session;

pub use adapter::{ArchiveEntry, OutputEmitter, TitleStore};
pub use config::MatchPolicy;
pub use error::{DocumentError, ReconError};
pub use matcher::extract;
pub use model::{
    InputDocument, MatchCandidate, ReconciliationRecord, ReferenceCorpus, SessionSummary, SourceFile,
};
pub use normalize::normalize;
pub use report::{BatchReport, ReportRow};
pub use session::{BatchOutput, ConfirmOutcome, ReconSession, SessionState};
