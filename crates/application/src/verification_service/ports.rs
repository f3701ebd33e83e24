use async_trait::async_trait;

use super::*;

/// Answer of an external token verifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenVerification {
    /// Whether the token was accepted.
    pub success: bool,
    /// When the challenge was solved, as reported by the verifier.
    pub challenge_ts: Option<String>,
    /// Hostname the challenge was served on.
    pub hostname: Option<String>,
    /// Verifier error codes, empty on success.
    pub error_codes: Vec<String>,
    /// Widget action label.
    pub action: Option<String>,
    /// Customer data attached to the widget.
    pub cdata: Option<String>,
}

impl TokenVerification {
    /// Builds a failed answer carrying the given error codes.
    #[must_use]
    pub fn failed(error_codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            success: false,
            error_codes: error_codes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Port for the external challenge-token verifier.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verifies `token`, optionally bound to the caller IP.
    ///
    /// Errors mean no answer was obtained; a rejected token is an `Ok` answer
    /// with `success == false`.
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> AppResult<TokenVerification>;
}

/// Verification log entry to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVerificationLogEntry {
    /// Token fingerprint.
    pub token_ref: String,
    /// Page the challenge was solved on.
    pub page: Option<String>,
    /// Verifier verdict.
    pub success: bool,
    /// Caller IP address.
    pub ip_address: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// Device class detected from the user agent.
    pub device: Option<String>,
}

/// Stored verification log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationLogEntry {
    /// Storage identifier.
    pub id: i64,
    /// Token fingerprint.
    pub token_ref: String,
    /// Page the challenge was solved on.
    pub page: Option<String>,
    /// Verifier verdict.
    pub success: bool,
    /// Caller IP address.
    pub ip_address: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// Device class detected from the user agent.
    pub device: Option<String>,
    /// When the entry was stored.
    pub created_at: DateTime<Utc>,
}

/// Filters for listing verification log entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationLogQuery {
    /// Inclusive lower bound on `created_at`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end_date: Option<DateTime<Utc>>,
    /// Only entries with this verdict.
    pub success: Option<bool>,
    /// Only entries for this page.
    pub page: Option<String>,
    /// Maximum number of entries returned.
    pub limit: u32,
    /// Number of matching entries skipped, newest first.
    pub offset: u32,
}

/// One page of verification log entries, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationLogPage {
    /// Entries on this page.
    pub entries: Vec<VerificationLogEntry>,
    /// Number of entries matching the filters across all pages.
    pub total: u64,
    /// One-based page number derived from offset and limit.
    pub page_number: u32,
    /// Page size applied.
    pub limit: u32,
}

/// Repository port for the verification log.
#[async_trait]
pub trait VerificationLogRepository: Send + Sync {
    /// Appends an entry and returns it as stored.
    async fn append_entry(&self, entry: NewVerificationLogEntry) -> AppResult<VerificationLogEntry>;

    /// Lists entries matching `query` newest first, with the total match count.
    async fn list_entries(
        &self,
        query: &VerificationLogQuery,
    ) -> AppResult<(Vec<VerificationLogEntry>, u64)>;
}
