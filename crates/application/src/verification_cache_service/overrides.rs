use chrono::Duration;

use super::*;

impl VerificationCacheService {
    /// Blocks `key` for `duration`, or for the configured manual block
    /// length when `duration` is absent or non-positive.
    ///
    /// Overrides any current state; blocking again resets the deadline.
    /// Returns the new deadline.
    pub fn block_ip(&self, key: &str, duration: Option<Duration>) -> DateTime<Utc> {
        let now = self.clock.now();
        let duration = duration
            .filter(|duration| *duration > Duration::zero())
            .unwrap_or_else(|| self.config.manual_block_duration());
        let block_until = now
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.store
            .upsert(key, &mut |record: &mut VerificationRecord| {
                record.block(block_until);
            });

        info!(identity_key = %key, %block_until, "identity blocked manually");
        block_until
    }

    /// Clears any block on `key`. Returns whether a record existed.
    pub fn unblock_ip(&self, key: &str) -> bool {
        let existed = self
            .store
            .update(key, &mut |record: &mut VerificationRecord| record.unblock());

        if existed {
            info!(identity_key = %key, "identity unblocked manually");
        }
        existed
    }

    /// Discards all history and block state for `key`. Returns whether a
    /// record existed.
    pub fn clear_record(&self, key: &str) -> bool {
        let existed = self.store.remove(key);
        if existed {
            info!(identity_key = %key, "verification record cleared");
        }
        existed
    }
}
