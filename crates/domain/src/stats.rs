use chrono::{DateTime, Utc};

use crate::{EffectiveState, VerificationRecord};

/// Per-identity statistics reported to operators.
///
/// The default value is the shape reported for an identity that has never
/// been seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStats {
    /// All retained attempts, regardless of the window.
    pub total_attempts: usize,
    /// Attempts inside the decision window.
    pub recent_attempts: usize,
    /// Failed attempts inside the decision window.
    pub failed_attempts: usize,
    /// Successful attempts inside the decision window.
    pub succeeded_attempts: usize,
    /// Whether a block is in force.
    pub is_blocked: bool,
    /// Deadline of the block in force.
    pub block_until: Option<DateTime<Utc>>,
    /// Time of the most recent attempt.
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl RecordStats {
    /// Builds statistics from a record and its effective state.
    #[must_use]
    pub fn from_state(record: &VerificationRecord, state: &EffectiveState) -> Self {
        Self {
            total_attempts: record.attempts().len(),
            recent_attempts: state.counts.recent,
            failed_attempts: state.counts.recent_failed,
            succeeded_attempts: state.counts.recent_succeeded,
            is_blocked: state.block.is_blocked(),
            block_until: state.block.active_until(),
            last_attempt_at: record.last_attempt_at(),
        }
    }
}

/// Store-wide aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Records currently held.
    pub total_records: usize,
    /// Records with a block in force.
    pub blocked_count: usize,
    /// Retained attempts across all records.
    pub total_attempts: usize,
}
