use tracing::warn;
use veriguard_domain::{AdmissionDecision, Attempt, BlockTransition};

use super::*;

impl VerificationCacheService {
    /// Decides whether `key` may attempt verification now.
    ///
    /// Clears a lapsed block as a side effect.
    pub fn admit(&self, key: &str) -> AdmissionDecision {
        let now = self.clock.now();

        match self.observe(key, now) {
            Some((_, state)) => {
                AdmissionDecision::decide(&state, self.config.max_attempts_per_window())
            }
            None => AdmissionDecision::Allow,
        }
    }

    /// Records the outcome of one verification attempt for `key`.
    ///
    /// Appends the attempt, re-evaluates the block policy, then trims
    /// attempts beyond the retention horizon. The record is dropped if that
    /// leaves it empty and unblocked.
    pub fn record_outcome(
        &self,
        key: &str,
        succeeded: bool,
        token_ref: Option<String>,
        tag: Option<String>,
    ) {
        let now = self.clock.now();
        let policy = self.block_policy();
        let cutoff = self.retention_cutoff(now);
        let mut attempt = Some(
            Attempt::new(now, succeeded)
                .with_token_ref(token_ref)
                .with_tag(tag),
        );
        let mut transition = BlockTransition::Unchanged;

        self.store
            .upsert(key, &mut |record: &mut VerificationRecord| {
                if let Some(attempt) = attempt.take() {
                    record.record_attempt(attempt);
                }
                transition = policy.evaluate(record, now);
                record.trim_before(cutoff);
            });

        match transition {
            BlockTransition::Blocked {
                until,
                failed_attempts,
            } => {
                warn!(
                    identity_key = %key,
                    failed_attempts,
                    block_until = %until,
                    "identity blocked after repeated verification failures"
                );
            }
            BlockTransition::Expired { until } => {
                info!(identity_key = %key, block_until = %until, "verification block expired");
            }
            BlockTransition::Unchanged => {}
        }
    }
}
