use serde::{Deserialize, Serialize};
use ts_rs::TS;
use veriguard_application::{TokenVerification, VerificationLogEntry, VerificationLogPage};

/// Incoming payload for token verification.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/verify-request.ts"
)]
pub struct VerifyRequest {
    pub token: String,
    pub page: Option<String>,
}

/// Verifier answer as returned to clients.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/token-verification-response.ts"
)]
pub struct TokenVerificationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(rename = "error-codes")]
    pub error_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdata: Option<String>,
}

impl From<TokenVerification> for TokenVerificationResponse {
    fn from(value: TokenVerification) -> Self {
        Self {
            success: value.success,
            challenge_ts: value.challenge_ts,
            hostname: value.hostname,
            error_codes: value.error_codes,
            action: value.action,
            cdata: value.cdata,
        }
    }
}

/// Details attached to a rejected token.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/verify-failure-details.ts"
)]
pub struct VerifyFailureDetails {
    pub error_codes: Vec<String>,
    pub verification: TokenVerificationResponse,
}

/// Response of the verify endpoint.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/verify-response.ts"
)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TokenVerificationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<VerifyFailureDetails>,
}

impl VerifyResponse {
    /// Builds the response for a verifier answer.
    #[must_use]
    pub fn from_verification(verification: TokenVerification) -> Self {
        if verification.success {
            return Self {
                success: true,
                data: Some(verification.into()),
                error: None,
                details: None,
            };
        }

        Self {
            success: false,
            data: None,
            error: Some("Verification failed".to_owned()),
            details: Some(VerifyFailureDetails {
                error_codes: verification.error_codes.clone(),
                verification: verification.into(),
            }),
        }
    }
}

/// Details attached to a refused admission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admission-denied-details.ts"
)]
pub struct AdmissionDeniedDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_attempts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_attempts: Option<usize>,
    pub message: String,
}

/// Body of a 429 returned by the admission gate.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admission-denied-response.ts"
)]
pub struct AdmissionDeniedResponse {
    pub success: bool,
    pub error: String,
    pub details: AdmissionDeniedDetails,
}

/// Query string accepted by the metrics endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub success: Option<bool>,
    pub page: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// One verification log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/verification-metric-response.ts"
)]
pub struct VerificationMetricResponse {
    pub id: i64,
    pub token_ref: String,
    pub page: Option<String>,
    pub success: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device: Option<String>,
    pub timestamp: String,
}

impl From<VerificationLogEntry> for VerificationMetricResponse {
    fn from(value: VerificationLogEntry) -> Self {
        Self {
            id: value.id,
            token_ref: value.token_ref,
            page: value.page,
            success: value.success,
            ip_address: value.ip_address,
            user_agent: value.user_agent,
            device: value.device,
            timestamp: value.created_at.to_rfc3339(),
        }
    }
}

/// One page of verification log entries.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/metrics-response.ts"
)]
pub struct MetricsResponse {
    pub metrics: Vec<VerificationMetricResponse>,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub page: Option<u32>,
    pub limit: u32,
}

impl MetricsResponse {
    /// Builds the response; the page number is only reported for explicit
    /// `offset`/`limit` pagination.
    pub fn from_page(value: VerificationLogPage, paginated: bool) -> Self {
        Self {
            metrics: value
                .entries
                .into_iter()
                .map(VerificationMetricResponse::from)
                .collect(),
            total: value.total,
            page: paginated.then_some(value.page_number),
            limit: value.limit,
        }
    }
}
