use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use veriguard_application::VerificationRecordStore;
use veriguard_domain::VerificationRecord;

/// Process-local record store guarded by one lock.
///
/// Every mutation holds the write lock for the whole closure, so updates to a
/// key never interleave and a removed record cannot be resurrected by a
/// concurrent writer.
#[derive(Debug, Default)]
pub struct InMemoryVerificationRecordStore {
    records: RwLock<HashMap<String, VerificationRecord>>,
}

impl InMemoryVerificationRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Mutations finish before any caller code can panic, so a poisoned map is
    // still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, VerificationRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, VerificationRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VerificationRecordStore for InMemoryVerificationRecordStore {
    fn get(&self, key: &str) -> Option<VerificationRecord> {
        self.read().get(key).cloned()
    }

    fn upsert(&self, key: &str, mutate: &mut dyn FnMut(&mut VerificationRecord)) {
        let mut records = self.write();
        let record = records
            .entry(key.to_owned())
            .or_insert_with(|| VerificationRecord::new(key));
        mutate(record);

        if record.is_reclaimable() {
            records.remove(key);
        }
    }

    fn update(&self, key: &str, mutate: &mut dyn FnMut(&mut VerificationRecord)) -> bool {
        let mut records = self.write();
        let Some(record) = records.get_mut(key) else {
            return false;
        };
        mutate(record);

        if record.is_reclaimable() {
            records.remove(key);
        }
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    fn for_each(&self, visit: &mut dyn FnMut(&VerificationRecord)) {
        self.read().values().for_each(visit);
    }

    fn retain(&self, keep: &mut dyn FnMut(&mut VerificationRecord) -> bool) -> usize {
        let mut records = self.write();
        let before = records.len();
        records.retain(|_, record| keep(record));
        before - records.len()
    }

    fn clear(&self) -> usize {
        let mut records = self.write();
        let released = records.len();
        records.clear();
        released
    }
}
