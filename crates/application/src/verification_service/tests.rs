use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use veriguard_core::{AppError, AppResult, NonEmptyString};
use veriguard_domain::{AdmissionDecision, DenyReason, VerificationRecord};

use crate::{Clock, VerificationCacheConfig, VerificationCacheService, VerificationRecordStore};

use super::{
    INTERNAL_ERROR_CODE, MAX_METRICS_LIMIT, NewVerificationLogEntry, TokenVerification,
    TokenVerifier, VerificationLogEntry, VerificationLogQuery, VerificationLogRepository,
    VerificationRequest, VerificationService, token_fingerprint,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        fixed_now()
    }
}

#[derive(Default)]
struct FakeRecordStore {
    records: Mutex<HashMap<String, VerificationRecord>>,
}

impl VerificationRecordStore for FakeRecordStore {
    fn get(&self, key: &str) -> Option<VerificationRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn upsert(&self, key: &str, mutate: &mut dyn FnMut(&mut VerificationRecord)) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        mutate(
            records
                .entry(key.to_owned())
                .or_insert_with(|| VerificationRecord::new(key)),
        );
    }

    fn update(&self, key: &str, mutate: &mut dyn FnMut(&mut VerificationRecord)) -> bool {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.get_mut(key).map(|record| mutate(record)).is_some()
    }

    fn remove(&self, key: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    fn for_each(&self, visit: &mut dyn FnMut(&VerificationRecord)) {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.values().for_each(visit);
    }

    fn retain(&self, keep: &mut dyn FnMut(&mut VerificationRecord) -> bool) -> usize {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|_, record| keep(record));
        before - records.len()
    }

    fn clear(&self) -> usize {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let released = records.len();
        records.clear();
        released
    }
}

enum VerifierReply {
    Accept,
    Reject(&'static str),
    Unreachable,
}

struct FakeTokenVerifier {
    reply: VerifierReply,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeTokenVerifier {
    fn new(reply: VerifierReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TokenVerifier for FakeTokenVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> AppResult<TokenVerification> {
        self.calls
            .lock()
            .map_err(|error| AppError::Internal(format!("verifier calls lock poisoned: {error}")))?
            .push((token.to_owned(), remote_ip.map(str::to_owned)));

        match self.reply {
            VerifierReply::Accept => Ok(TokenVerification {
                success: true,
                hostname: Some("example.test".to_owned()),
                ..TokenVerification::default()
            }),
            VerifierReply::Reject(code) => Ok(TokenVerification::failed([code])),
            VerifierReply::Unreachable => {
                Err(AppError::Unavailable("connection refused".to_owned()))
            }
        }
    }
}

#[derive(Default)]
struct FakeLogRepository {
    entries: Mutex<Vec<VerificationLogEntry>>,
    seen_queries: Mutex<Vec<VerificationLogQuery>>,
    fail_appends: bool,
}

#[async_trait]
impl VerificationLogRepository for FakeLogRepository {
    async fn append_entry(&self, entry: NewVerificationLogEntry) -> AppResult<VerificationLogEntry> {
        if self.fail_appends {
            return Err(AppError::Unavailable("database offline".to_owned()));
        }

        let mut entries = self
            .entries
            .lock()
            .map_err(|error| AppError::Internal(format!("log lock poisoned: {error}")))?;
        let stored = VerificationLogEntry {
            id: i64::try_from(entries.len()).unwrap_or(i64::MAX) + 1,
            token_ref: entry.token_ref,
            page: entry.page,
            success: entry.success,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            device: entry.device,
            created_at: fixed_now(),
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn list_entries(
        &self,
        query: &VerificationLogQuery,
    ) -> AppResult<(Vec<VerificationLogEntry>, u64)> {
        self.seen_queries
            .lock()
            .map_err(|error| AppError::Internal(format!("query lock poisoned: {error}")))?
            .push(query.clone());
        let entries = self
            .entries
            .lock()
            .map_err(|error| AppError::Internal(format!("log lock poisoned: {error}")))?
            .clone();
        let total = entries.len() as u64;
        Ok((entries, total))
    }
}

struct Fixture {
    verifier: Arc<FakeTokenVerifier>,
    log_repository: Arc<FakeLogRepository>,
    cache: VerificationCacheService,
    service: VerificationService,
}

fn fixture(reply: VerifierReply, log_repository: FakeLogRepository) -> Fixture {
    let verifier = Arc::new(FakeTokenVerifier::new(reply));
    let log_repository = Arc::new(log_repository);
    let cache = VerificationCacheService::new(
        VerificationCacheConfig::default(),
        Arc::new(FakeRecordStore::default()),
        Arc::new(FixedClock),
    );
    let service = VerificationService::new(verifier.clone(), log_repository.clone(), cache.clone());

    Fixture {
        verifier,
        log_repository,
        cache,
        service,
    }
}

fn request(token: &str) -> VerificationRequest {
    VerificationRequest {
        token: NonEmptyString::new(token).unwrap_or_else(|_| unreachable!()),
        page: Some("signup".to_owned()),
        identity_key: "203.0.113.7".to_owned(),
        remote_ip: Some("203.0.113.7".to_owned()),
        user_agent: Some("Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)".to_owned()),
    }
}

#[tokio::test]
async fn accepted_token_is_counted_and_logged_without_raw_token() {
    let fixture = fixture(VerifierReply::Accept, FakeLogRepository::default());

    let outcome = fixture.service.verify_and_log(request("raw-token-1")).await;

    assert!(outcome.verification.success);
    let log_entry = outcome.log_entry.unwrap_or_else(|| unreachable!());
    assert_eq!(log_entry.token_ref, token_fingerprint("raw-token-1"));
    assert_ne!(log_entry.token_ref, "raw-token-1");
    assert_eq!(log_entry.device.as_deref(), Some("tablet"));
    assert_eq!(log_entry.page.as_deref(), Some("signup"));

    let stats = fixture.cache.get_record_stats("203.0.113.7");
    assert_eq!(stats.total_attempts, 1);
    assert_eq!(stats.succeeded_attempts, 1);

    let calls = fixture
        .verifier
        .calls
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    assert_eq!(
        calls,
        vec![("raw-token-1".to_owned(), Some("203.0.113.7".to_owned()))]
    );
}

#[tokio::test]
async fn unreachable_verifier_counts_as_failed_attempt() {
    let fixture = fixture(VerifierReply::Unreachable, FakeLogRepository::default());

    let outcome = fixture.service.verify_and_log(request("raw-token-2")).await;

    assert!(!outcome.verification.success);
    assert_eq!(
        outcome.verification.error_codes,
        vec![INTERNAL_ERROR_CODE.to_owned()]
    );
    assert_eq!(fixture.cache.get_record_stats("203.0.113.7").failed_attempts, 1);
}

#[tokio::test]
async fn repeated_rejections_block_the_identity() {
    let fixture = fixture(
        VerifierReply::Reject("invalid-input-response"),
        FakeLogRepository::default(),
    );

    for index in 0..5 {
        let outcome = fixture
            .service
            .verify_and_log(request(&format!("bad-{index}")))
            .await;
        assert_eq!(
            outcome.verification.error_codes,
            vec!["invalid-input-response".to_owned()]
        );
    }

    assert!(matches!(
        fixture.cache.admit("203.0.113.7"),
        AdmissionDecision::Deny(DenyReason::Blocked {
            recent_failed: 5,
            ..
        })
    ));
    let logged = fixture
        .log_repository
        .entries
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .len();
    assert_eq!(logged, 5);
}

#[tokio::test]
async fn log_failure_still_records_attempt() {
    let fixture = fixture(
        VerifierReply::Accept,
        FakeLogRepository {
            fail_appends: true,
            ..FakeLogRepository::default()
        },
    );

    let outcome = fixture.service.verify_and_log(request("raw-token-3")).await;

    assert!(outcome.verification.success);
    assert!(outcome.log_entry.is_none());
    assert_eq!(fixture.cache.get_record_stats("203.0.113.7").total_attempts, 1);
}

#[tokio::test]
async fn list_log_entries_normalizes_limit_and_derives_page_number() {
    let fixture = fixture(VerifierReply::Accept, FakeLogRepository::default());
    fixture.service.verify_and_log(request("raw-token-4")).await;

    let default_page = fixture
        .service
        .list_log_entries(VerificationLogQuery::default())
        .await;
    let capped_page = fixture
        .service
        .list_log_entries(VerificationLogQuery {
            limit: 10_000,
            offset: 1_000,
            ..VerificationLogQuery::default()
        })
        .await;

    let default_page = default_page.unwrap_or_else(|error| panic!("{error}"));
    assert_eq!(default_page.limit, 50);
    assert_eq!(default_page.page_number, 1);
    assert_eq!(default_page.total, 1);

    let capped_page = capped_page.unwrap_or_else(|error| panic!("{error}"));
    assert_eq!(capped_page.limit, MAX_METRICS_LIMIT);
    assert_eq!(capped_page.page_number, 3);

    let seen_limits: Vec<u32> = fixture
        .log_repository
        .seen_queries
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|query| query.limit)
        .collect();
    assert_eq!(seen_limits, vec![50, 500]);
}

#[test]
fn token_fingerprint_is_short_and_stable() {
    let fingerprint = token_fingerprint("abc");

    assert_eq!(fingerprint, "ba7816bf8f01cfea");
    assert_eq!(fingerprint, token_fingerprint("abc"));
    assert_ne!(fingerprint, token_fingerprint("abd"));
}
