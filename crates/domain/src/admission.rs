use chrono::{DateTime, Utc};

use crate::EffectiveState;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The attempt may proceed to verification.
    Allow,
    /// The attempt must be refused.
    Deny(DenyReason),
}

/// Why an attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The identity is blocked.
    Blocked {
        /// When the block lapses.
        block_until: DateTime<Utc>,
        /// Failed attempts inside the decision window.
        recent_failed: usize,
    },
    /// The identity used up its attempts for the current window.
    RateLimited {
        /// Attempts inside the decision window.
        recent_attempts: usize,
    },
}

impl AdmissionDecision {
    /// Derives the decision from a record's effective state.
    ///
    /// An active block wins over the rate limit.
    #[must_use]
    pub fn decide(state: &EffectiveState, max_attempts_per_window: u32) -> Self {
        if let Some(block_until) = state.block.active_until() {
            return Self::Deny(DenyReason::Blocked {
                block_until,
                recent_failed: state.counts.recent_failed,
            });
        }

        let quota = usize::try_from(max_attempts_per_window).unwrap_or(usize::MAX);
        if state.counts.recent >= quota {
            return Self::Deny(DenyReason::RateLimited {
                recent_attempts: state.counts.recent,
            });
        }

        Self::Allow
    }

    /// Returns whether the attempt may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}
