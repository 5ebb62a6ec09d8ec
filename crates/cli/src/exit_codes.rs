//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success                                                    |
//! | 1    | General error (unspecified)                                |
//! | 2    | Usage error (bad args, missing corpus)                     |
//! | 3    | I/O error (unreadable input, unwritable output directory)  |
//! | 4    | Empty batch (no PDF documents among the inputs)            |
//! | 5    | Output generation failed (report or archive)               |
//! | 6    | Review aborted by the operator before finalization         |
//! | 7    | Invalid configuration (settings file or policy values)     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` or the relevant command

use retitle_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input or write an output file.
pub const EXIT_IO: u8 = 3;

/// The batch contained zero PDF documents.
pub const EXIT_EMPTY_BATCH: u8 = 4;

/// The report or archive could not be produced.
pub const EXIT_EMIT: u8 = 5;

/// Operator quit the review before the last record was confirmed.
pub const EXIT_ABORTED: u8 = 6;

/// Settings file or match policy failed validation.
pub const EXIT_CONFIG: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::EmptyBatch => EXIT_EMPTY_BATCH,
        ReconError::Emit(_) => EXIT_EMIT,
        ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::InvalidState { .. }
        | ReconError::UnknownMatch(_)
        | ReconError::MatchIndex { .. } => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_registry() {
        assert_eq!(recon_exit_code(&ReconError::EmptyBatch), EXIT_EMPTY_BATCH);
        assert_eq!(recon_exit_code(&ReconError::Emit("disk full".into())), EXIT_EMIT);
        assert_eq!(
            recon_exit_code(&ReconError::ConfigValidation("cutoff".into())),
            EXIT_CONFIG
        );
        assert_eq!(recon_exit_code(&ReconError::UnknownMatch("x".into())), EXIT_ERROR);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_EMPTY_BATCH,
            EXIT_EMIT,
            EXIT_ABORTED,
            EXIT_CONFIG,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
