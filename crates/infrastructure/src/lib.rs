//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod cache_sweeper;
mod in_memory_verification_log_repository;
mod in_memory_verification_record_store;
mod postgres_verification_log_repository;
mod system_clock;
mod turnstile_token_verifier;

pub use cache_sweeper::CacheSweeper;
pub use in_memory_verification_log_repository::InMemoryVerificationLogRepository;
pub use in_memory_verification_record_store::InMemoryVerificationRecordStore;
pub use postgres_verification_log_repository::{
    PostgresVerificationLogRepository, run_migrations,
};
pub use system_clock::SystemClock;
pub use turnstile_token_verifier::{DEFAULT_TURNSTILE_VERIFY_URL, TurnstileTokenVerifier};
