use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use veriguard_application::{
    NewVerificationLogEntry, VerificationLogEntry, VerificationLogQuery, VerificationLogRepository,
};
use veriguard_core::AppResult;

/// Process-local verification log used when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryVerificationLogRepository {
    entries: RwLock<Vec<VerificationLogEntry>>,
}

impl InMemoryVerificationLogRepository {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_query(entry: &VerificationLogEntry, query: &VerificationLogQuery) -> bool {
    query
        .start_date
        .is_none_or(|start_date| entry.created_at >= start_date)
        && query
            .end_date
            .is_none_or(|end_date| entry.created_at <= end_date)
        && query.success.is_none_or(|success| entry.success == success)
        && query
            .page
            .as_deref()
            .is_none_or(|page| entry.page.as_deref() == Some(page))
}

#[async_trait]
impl VerificationLogRepository for InMemoryVerificationLogRepository {
    async fn append_entry(&self, entry: NewVerificationLogEntry) -> AppResult<VerificationLogEntry> {
        let mut entries = self.entries.write().await;
        let stored = VerificationLogEntry {
            id: i64::try_from(entries.len()).unwrap_or(i64::MAX).saturating_add(1),
            token_ref: entry.token_ref,
            page: entry.page,
            success: entry.success,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            device: entry.device,
            created_at: Utc::now(),
        };
        entries.push(stored.clone());

        Ok(stored)
    }

    async fn list_entries(
        &self,
        query: &VerificationLogQuery,
    ) -> AppResult<(Vec<VerificationLogEntry>, u64)> {
        let entries = self.entries.read().await;
        let matching: Vec<&VerificationLogEntry> = entries
            .iter()
            .rev()
            .filter(|entry| matches_query(entry, query))
            .collect();
        let total = matching.len() as u64;

        let page = matching
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok((page, total))
    }
}
