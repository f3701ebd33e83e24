use super::*;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_METRICS_LIMIT: u32 = 50;

/// Largest page size served.
pub const MAX_METRICS_LIMIT: u32 = 500;

impl VerificationService {
    /// Lists verification log entries newest first.
    ///
    /// A zero limit falls back to [`DEFAULT_METRICS_LIMIT`]; larger limits
    /// are capped at [`MAX_METRICS_LIMIT`].
    pub async fn list_log_entries(
        &self,
        mut query: VerificationLogQuery,
    ) -> AppResult<VerificationLogPage> {
        query.limit = match query.limit {
            0 => DEFAULT_METRICS_LIMIT,
            limit => limit.min(MAX_METRICS_LIMIT),
        };

        let (entries, total) = self.log_repository.list_entries(&query).await?;

        Ok(VerificationLogPage {
            entries,
            total,
            page_number: query.offset / query.limit + 1,
            limit: query.limit,
        })
    }
}
