//! Application services and ports.

#![forbid(unsafe_code)]

mod verification_cache_service;
mod verification_service;

pub use verification_cache_service::{
    Clock, ConfigCorrection, DEFAULT_BLOCK_DURATION_MINUTES, DEFAULT_CLEANUP_INTERVAL_MINUTES,
    DEFAULT_MAX_ATTEMPTS_PER_WINDOW, DEFAULT_MAX_FAILED_ATTEMPTS, DEFAULT_RETENTION_MULTIPLIER,
    DEFAULT_WINDOW_MINUTES, MAX_DURATION_MINUTES, SweepReport, VerificationCacheConfig,
    VerificationCacheService, VerificationCacheSettings, VerificationRecordStore,
};
pub use verification_service::{
    DEFAULT_METRICS_LIMIT, INTERNAL_ERROR_CODE, MAX_METRICS_LIMIT, NewVerificationLogEntry,
    TokenVerification, TokenVerifier, VerificationLogEntry, VerificationLogPage,
    VerificationLogQuery, VerificationLogRepository, VerificationOutcome, VerificationRequest,
    VerificationService, token_fingerprint,
};
