//! Adaptive admission and blocking cache for verification attempts.
//!
//! Tracks recent verification attempts per identity key, refuses identities
//! that used up their per-window quota, and blocks identities that keep
//! failing. State lives only in memory; a periodic sweep bounds its size.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use veriguard_domain::{BlockPolicy, EffectiveState, VerificationRecord};

mod admission;
mod config;
mod overrides;
mod ports;
mod reporting;
mod sweep;


pub use config::{
    ConfigCorrection, DEFAULT_BLOCK_DURATION_MINUTES, DEFAULT_CLEANUP_INTERVAL_MINUTES,
    DEFAULT_MAX_ATTEMPTS_PER_WINDOW, DEFAULT_MAX_FAILED_ATTEMPTS, DEFAULT_RETENTION_MULTIPLIER,
    DEFAULT_WINDOW_MINUTES, MAX_DURATION_MINUTES, VerificationCacheConfig,
    VerificationCacheSettings,
};
pub use ports::{Clock, VerificationRecordStore};
pub use sweep::SweepReport;

/// Application service guarding verification attempts per identity key.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct VerificationCacheService {
    config: Arc<VerificationCacheConfig>,
    store: Arc<dyn VerificationRecordStore>,
    clock: Arc<dyn Clock>,
}

impl VerificationCacheService {
    /// Creates a service over the given store and clock.
    #[must_use]
    pub fn new(
        config: VerificationCacheConfig,
        store: Arc<dyn VerificationRecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            clock,
        }
    }

    /// Returns the configuration in effect.
    #[must_use]
    pub fn config(&self) -> &VerificationCacheConfig {
        &self.config
    }

    /// Drops every record. Called once the sweeper has stopped.
    pub fn shutdown(&self) -> usize {
        let released_records = self.store.clear();
        info!(released_records, "verification cache released");
        released_records
    }

    fn block_policy(&self) -> BlockPolicy {
        BlockPolicy {
            max_failed_attempts: self.config.max_failed_attempts(),
            block_duration: self.config.block_duration(),
            window: self.config.window_duration(),
        }
    }

    fn retention_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.config.retention_horizon())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Reads the record for `key` and clears its block if it has lapsed.
    fn observe(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<(VerificationRecord, EffectiveState)> {
        let record = self.store.get(key)?;
        let state = record.effective_state(now, self.config.window_duration());
        if state.block.is_lapsed() {
            self.expire_lapsed_block(key, now);
        }

        Some((record, state))
    }

    fn expire_lapsed_block(&self, key: &str, now: DateTime<Utc>) {
        let mut expired = None;
        self.store
            .update(key, &mut |record: &mut VerificationRecord| {
                expired = record.expire_lapsed_block(now);
            });

        if let Some(block_until) = expired {
            info!(identity_key = %key, %block_until, "verification block expired");
        }
    }
}
