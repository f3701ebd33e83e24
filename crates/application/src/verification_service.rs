//! Token verification orchestration and the verification log.
//!
//! Ties the external token verifier, the verification cache and the
//! verification log together so every verified token is counted once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use veriguard_core::{AppResult, NonEmptyString};
use veriguard_domain::DeviceClass;

use crate::VerificationCacheService;

mod metrics;
mod ports;
mod token_fingerprint;
mod verify;

#[cfg(test)]
mod tests;

pub use metrics::{DEFAULT_METRICS_LIMIT, MAX_METRICS_LIMIT};
pub use ports::{
    NewVerificationLogEntry, TokenVerification, TokenVerifier, VerificationLogEntry,
    VerificationLogPage, VerificationLogQuery, VerificationLogRepository,
};
pub use token_fingerprint::token_fingerprint;

/// Error code reported when the verifier could not produce an answer.
pub const INTERNAL_ERROR_CODE: &str = "internal-error";

/// One verification request as received from a client.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// Token issued by the challenge widget.
    pub token: NonEmptyString,
    /// Page the challenge was solved on.
    pub page: Option<String>,
    /// Identity key the attempt is counted against.
    pub identity_key: String,
    /// Caller IP forwarded to the verifier, if known.
    pub remote_ip: Option<String>,
    /// Caller user agent, if sent.
    pub user_agent: Option<String>,
}

/// Result of [`VerificationService::verify_and_log`].
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    /// Answer from the token verifier.
    pub verification: TokenVerification,
    /// Stored log entry, absent when persisting it failed.
    pub log_entry: Option<VerificationLogEntry>,
}

/// Application service for verifying tokens and reading the verification log.
#[derive(Clone)]
pub struct VerificationService {
    verifier: Arc<dyn TokenVerifier>,
    log_repository: Arc<dyn VerificationLogRepository>,
    cache: VerificationCacheService,
}

impl VerificationService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        log_repository: Arc<dyn VerificationLogRepository>,
        cache: VerificationCacheService,
    ) -> Self {
        Self {
            verifier,
            log_repository,
            cache,
        }
    }
}
