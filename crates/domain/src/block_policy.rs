use chrono::{DateTime, Duration, Utc};

use crate::{BlockStatus, VerificationRecord};

/// Automatic block rule driven by failed attempts inside the decision window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPolicy {
    /// Failed attempts inside the window that trigger a block.
    pub max_failed_attempts: u32,
    /// Length of an automatic block.
    pub block_duration: Duration,
    /// Decision window for counting failures.
    pub window: Duration,
}

/// State change produced by [`BlockPolicy::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTransition {
    /// Nothing changed.
    Unchanged,
    /// The record was blocked by this evaluation.
    Blocked {
        /// New block deadline.
        until: DateTime<Utc>,
        /// Failures counted inside the window.
        failed_attempts: usize,
    },
    /// A lapsed block was cleared by this evaluation.
    Expired {
        /// The deadline that had passed.
        until: DateTime<Utc>,
    },
}

impl BlockPolicy {
    /// Applies the block rule to `record` at `now`.
    ///
    /// A lapsed block is cleared and nothing else happens in the same call.
    /// Otherwise an unblocked record whose windowed failures reached
    /// `max_failed_attempts` becomes blocked for `block_duration`.
    pub fn evaluate(&self, record: &mut VerificationRecord, now: DateTime<Utc>) -> BlockTransition {
        match record.block_status(now) {
            BlockStatus::Lapsed { until } => {
                record.unblock();
                BlockTransition::Expired { until }
            }
            BlockStatus::Active { .. } => BlockTransition::Unchanged,
            BlockStatus::Clear => {
                let failed_attempts = record.window_counts(now, self.window).recent_failed;
                let threshold = usize::try_from(self.max_failed_attempts).unwrap_or(usize::MAX);
                if failed_attempts < threshold {
                    return BlockTransition::Unchanged;
                }

                let until = now + self.block_duration;
                record.block(until);
                BlockTransition::Blocked {
                    until,
                    failed_attempts,
                }
            }
        }
    }
}
