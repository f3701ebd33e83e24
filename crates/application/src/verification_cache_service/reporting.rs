use veriguard_domain::{BlockStatus, CacheStats, RecordStats};

use super::*;

impl VerificationCacheService {
    /// Returns statistics for `key`, or the all-zero shape for an unknown key.
    pub fn get_record_stats(&self, key: &str) -> RecordStats {
        let now = self.clock.now();

        self.observe(key, now)
            .map(|(record, state)| RecordStats::from_state(&record, &state))
            .unwrap_or_default()
    }

    /// Returns the keys with a block in force, sorted.
    ///
    /// Lapsed blocks found during the scan are cleared afterwards.
    pub fn get_blocked_ips(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut blocked = Vec::new();
        let mut lapsed = Vec::new();

        self.store.for_each(&mut |record: &VerificationRecord| {
            match record.block_status(now) {
                BlockStatus::Active { .. } => blocked.push(record.key().to_owned()),
                BlockStatus::Lapsed { .. } => lapsed.push(record.key().to_owned()),
                BlockStatus::Clear => {}
            }
        });

        for key in &lapsed {
            self.expire_lapsed_block(key, now);
        }

        blocked.sort_unstable();
        blocked
    }

    /// Aggregates record, block and attempt counts over the whole store.
    pub fn get_cache_stats(&self) -> CacheStats {
        let now = self.clock.now();
        let mut stats = CacheStats::default();

        self.store.for_each(&mut |record: &VerificationRecord| {
            stats.total_records += 1;
            stats.total_attempts += record.attempts().len();
            if record.block_status(now).is_blocked() {
                stats.blocked_count += 1;
            }
        });

        stats
    }
}
