use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Default number of candidates kept per query.
pub const DEFAULT_LIMIT: usize = 5;

/// Default minimum score (0-100) a candidate must reach.
pub const DEFAULT_CUTOFF: u8 = 60;

/// Scoring policy applied by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_cutoff")]
    pub cutoff: u8,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_cutoff() -> u8 {
    DEFAULT_CUTOFF
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

impl MatchPolicy {
    pub fn new(limit: usize, cutoff: u8) -> Result<Self, ReconError> {
        let policy = Self { limit, cutoff };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.limit == 0 {
            return Err(ReconError::ConfigValidation(
                "limit must be at least 1".into(),
            ));
        }
        if self.cutoff > 100 {
            return Err(ReconError::ConfigValidation(format!(
                "cutoff must be within 0..=100, got {}",
                self.cutoff
            )));
        }
        Ok(())
    }
}
