use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::{Attempt, WindowCounts};

/// Block state of a record as seen by readers at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// No block is set.
    Clear,
    /// A block is set and still in force.
    Active {
        /// When the block lapses.
        until: DateTime<Utc>,
    },
    /// A block flag is still set but its deadline has passed.
    ///
    /// Readers treat this exactly like [`BlockStatus::Clear`].
    Lapsed {
        /// The deadline that has passed.
        until: DateTime<Utc>,
    },
}

impl BlockStatus {
    /// Returns whether admission must be refused because of a block.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Returns whether a stale block flag is waiting to be cleared.
    #[must_use]
    pub fn is_lapsed(&self) -> bool {
        matches!(self, Self::Lapsed { .. })
    }

    /// Returns the deadline of an active block.
    #[must_use]
    pub fn active_until(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active { until } => Some(*until),
            Self::Clear | Self::Lapsed { .. } => None,
        }
    }
}

/// Window counts and lazily-expired block status of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveState {
    /// Counts inside the decision window.
    pub counts: WindowCounts,
    /// Block status after applying lazy expiry.
    pub block: BlockStatus,
}

/// Per-identity attempt history and block state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    key: String,
    attempts: VecDeque<Attempt>,
    blocked: bool,
    block_until: Option<DateTime<Utc>>,
    last_attempt_at: Option<DateTime<Utc>>,
}

impl VerificationRecord {
    /// Creates an empty, unblocked record.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            attempts: VecDeque::new(),
            blocked: false,
            block_until: None,
            last_attempt_at: None,
        }
    }

    /// Returns the identity key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns retained attempts in ascending `occurred_at` order.
    #[must_use]
    pub fn attempts(&self) -> &VecDeque<Attempt> {
        &self.attempts
    }

    /// Returns the raw block flag without applying lazy expiry.
    #[must_use]
    pub fn blocked_flag(&self) -> bool {
        self.blocked
    }

    /// Returns the raw block deadline without applying lazy expiry.
    #[must_use]
    pub fn block_until(&self) -> Option<DateTime<Utc>> {
        self.block_until
    }

    /// Returns the time of the most recent attempt.
    #[must_use]
    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }

    /// Appends an attempt, keeping the history sorted by `occurred_at`.
    pub fn record_attempt(&mut self, attempt: Attempt) {
        let occurred_at = attempt.occurred_at();
        let index = self
            .attempts
            .partition_point(|existing| existing.occurred_at() <= occurred_at);
        self.attempts.insert(index, attempt);

        self.last_attempt_at = Some(
            self.last_attempt_at
                .map_or(occurred_at, |last| last.max(occurred_at)),
        );
    }

    /// Counts attempts inside the trailing window ending at `now`.
    #[must_use]
    pub fn window_counts(&self, now: DateTime<Utc>, window: Duration) -> WindowCounts {
        WindowCounts::evaluate(&self.attempts, now, window)
    }

    /// Block status at `now` with lazy expiry applied.
    ///
    /// A block whose deadline is strictly before `now` is lapsed.
    #[must_use]
    pub fn block_status(&self, now: DateTime<Utc>) -> BlockStatus {
        match (self.blocked, self.block_until) {
            (false, _) => BlockStatus::Clear,
            (true, Some(until)) if now > until => BlockStatus::Lapsed { until },
            (true, Some(until)) => BlockStatus::Active { until },
            // Flag without a deadline; the next writer clears it.
            (true, None) => BlockStatus::Lapsed { until: now },
        }
    }

    /// Combined window counts and block status used by every reader.
    #[must_use]
    pub fn effective_state(&self, now: DateTime<Utc>, window: Duration) -> EffectiveState {
        EffectiveState {
            counts: self.window_counts(now, window),
            block: self.block_status(now),
        }
    }

    /// Places the record in the blocked state until `until`.
    pub fn block(&mut self, until: DateTime<Utc>) {
        self.blocked = true;
        self.block_until = Some(until);
    }

    /// Clears any block state unconditionally.
    pub fn unblock(&mut self) {
        self.blocked = false;
        self.block_until = None;
    }

    /// Clears a block whose deadline has passed. Returns the lapsed deadline.
    pub fn expire_lapsed_block(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.block_status(now) {
            BlockStatus::Lapsed { until } => {
                self.unblock();
                Some(until)
            }
            BlockStatus::Clear | BlockStatus::Active { .. } => None,
        }
    }

    /// Drops attempts older than `cutoff`. Returns how many were removed.
    pub fn trim_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let stale = self
            .attempts
            .partition_point(|attempt| attempt.occurred_at() < cutoff);
        self.attempts.drain(..stale);
        stale
    }

    /// Returns whether the record has no history and no block, so it can be dropped.
    #[must_use]
    pub fn is_reclaimable(&self) -> bool {
        self.attempts.is_empty() && !self.blocked
    }
}
