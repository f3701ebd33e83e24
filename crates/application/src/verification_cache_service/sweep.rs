use tracing::debug;

use super::*;

/// What one sweep pass reclaimed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Attempts dropped for being older than the retention horizon.
    pub trimmed_attempts: usize,
    /// Lapsed blocks that were cleared.
    pub expired_blocks: usize,
    /// Records removed for being empty and unblocked.
    pub removed_records: usize,
}

impl SweepReport {
    /// Returns whether the pass changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trimmed_attempts == 0 && self.expired_blocks == 0 && self.removed_records == 0
    }
}

impl VerificationCacheService {
    /// Runs one reclamation pass over every record.
    ///
    /// Clears lapsed blocks, trims attempts beyond the retention horizon and
    /// removes records left empty and unblocked.
    pub fn sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let cutoff = self.retention_cutoff(now);
        let mut trimmed_attempts = 0;
        let mut expired_blocks = 0;

        let removed_records = self
            .store
            .retain(&mut |record: &mut VerificationRecord| {
                if record.expire_lapsed_block(now).is_some() {
                    expired_blocks += 1;
                }
                trimmed_attempts += record.trim_before(cutoff);
                !record.is_reclaimable()
            });

        let report = SweepReport {
            trimmed_attempts,
            expired_blocks,
            removed_records,
        };

        if report.is_empty() {
            debug!("verification cache sweep found nothing to reclaim");
        } else {
            info!(
                removed_records,
                expired_blocks, trimmed_attempts, "verification cache sweep reclaimed entries"
            );
        }

        report
    }
}
