use serde::{Deserialize, Serialize};
use ts_rs::TS;
use veriguard_domain::{CacheStats, RecordStats};

/// Store-wide cache statistics.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/cache-stats-response.ts"
)]
pub struct CacheStatsResponse {
    pub total_records: usize,
    pub blocked_count: usize,
    pub total_attempts: usize,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(value: CacheStats) -> Self {
        Self {
            total_records: value.total_records,
            blocked_count: value.blocked_count,
            total_attempts: value.total_attempts,
        }
    }
}

/// Identities with a block in force.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/blocked-ips-response.ts"
)]
pub struct BlockedIpsResponse {
    pub blocked: Vec<String>,
    pub count: usize,
}

/// Statistics for one identity.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ip-stats-response.ts"
)]
pub struct IpStatsResponse {
    pub ip: String,
    pub total_attempts: usize,
    pub recent_attempts: usize,
    pub failed_attempts: usize,
    pub succeeded_attempts: usize,
    pub is_blocked: bool,
    pub block_until: Option<String>,
    pub last_attempt_at: Option<String>,
}

impl IpStatsResponse {
    /// Creates a response for `ip` from its statistics.
    #[must_use]
    pub fn new(ip: String, stats: RecordStats) -> Self {
        Self {
            ip,
            total_attempts: stats.total_attempts,
            recent_attempts: stats.recent_attempts,
            failed_attempts: stats.failed_attempts,
            succeeded_attempts: stats.succeeded_attempts,
            is_blocked: stats.is_blocked,
            block_until: stats.block_until.map(|value| value.to_rfc3339()),
            last_attempt_at: stats.last_attempt_at.map(|value| value.to_rfc3339()),
        }
    }
}

/// Incoming payload for a manual block.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/block-ip-request.ts"
)]
pub struct BlockIpRequest {
    pub duration_minutes: Option<i64>,
}

/// Result of a manual block, unblock or clear.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ip-action-response.ts"
)]
pub struct IpActionResponse {
    pub ip: String,
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_until: Option<String>,
    pub existed: bool,
    pub message: String,
}
