use chrono::{DateTime, Utc};

use veriguard_domain::VerificationRecord;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Keyed store owning every [`VerificationRecord`].
///
/// All mutating calls for one key are serialized with respect to each other.
/// After any mutating closure returns, a record that
/// [`is_reclaimable`](VerificationRecord::is_reclaimable) is removed before
/// the call returns, so an empty unblocked record is never left behind.
pub trait VerificationRecordStore: Send + Sync {
    /// Returns a copy of the record for `key`.
    fn get(&self, key: &str) -> Option<VerificationRecord>;

    /// Runs `mutate` on the record for `key`, creating an empty one when absent.
    fn upsert(&self, key: &str, mutate: &mut dyn FnMut(&mut VerificationRecord));

    /// Runs `mutate` on the record for `key` if it exists. Returns whether it existed.
    fn update(&self, key: &str, mutate: &mut dyn FnMut(&mut VerificationRecord)) -> bool;

    /// Removes the record for `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> bool;

    /// Visits every record. Each record is observed whole, but records may
    /// come from different instants.
    fn for_each(&self, visit: &mut dyn FnMut(&VerificationRecord));

    /// Runs `keep` on every record and removes those for which it returns
    /// `false`. Returns how many records were removed.
    fn retain(&self, keep: &mut dyn FnMut(&mut VerificationRecord) -> bool) -> usize;

    /// Removes every record. Returns how many were removed.
    fn clear(&self) -> usize;
}
