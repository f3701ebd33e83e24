use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use veriguard_application::{
    TokenVerification, TokenVerifier, VerificationCacheConfig, VerificationCacheService,
    VerificationService,
};
use veriguard_core::AppResult;
use veriguard_infrastructure::{
    InMemoryVerificationLogRepository, InMemoryVerificationRecordStore, SystemClock,
};

use super::build_router;
use crate::state::AppState;

const ADMIN_TOKEN: &str = "admin-secret";
const CLIENT_IP: &str = "198.51.100.20";

/// Accepts tokens starting with `pass`.
struct PrefixTokenVerifier;

#[async_trait]
impl TokenVerifier for PrefixTokenVerifier {
    async fn verify(&self, token: &str, _remote_ip: Option<&str>) -> AppResult<TokenVerification> {
        if token.starts_with("pass") {
            Ok(TokenVerification {
                success: true,
                hostname: Some("example.test".to_owned()),
                ..TokenVerification::default()
            })
        } else {
            Ok(TokenVerification::failed(["invalid-input-response"]))
        }
    }
}

fn test_state(admin_api_token: Option<&str>) -> AppState {
    let verification_cache = VerificationCacheService::new(
        VerificationCacheConfig::default(),
        Arc::new(InMemoryVerificationRecordStore::new()),
        Arc::new(SystemClock),
    );
    let verification_service = VerificationService::new(
        Arc::new(PrefixTokenVerifier),
        Arc::new(InMemoryVerificationLogRepository::new()),
        verification_cache.clone(),
    );

    AppState {
        verification_cache,
        verification_service,
        admin_api_token: admin_api_token.map(ToOwned::to_owned),
    }
}

fn router(state: AppState) -> Router {
    build_router(state, "http://localhost:3000").unwrap_or_else(|_| unreachable!())
}

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

fn verify_request(token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/verify")
        .header("content-type", "application/json")
        .header("x-forwarded-for", CLIENT_IP)
        .header("user-agent", "Mozilla/5.0 (Linux; Android 14) Mobile")
        .body(Body::from(
            json!({ "token": token, "page": "checkout" }).to_string(),
        ))
        .unwrap_or_else(|_| unreachable!())
}

fn admin_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {ADMIN_TOKEN}"));

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };

    request.unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn health_reports_ok() {
    let router = router(test_state(None));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());

    let (status, body) = call(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn accepted_token_returns_verification_and_counts_attempt() {
    let state = test_state(None);
    let router = router(state.clone());

    let (status, body) = call(&router, verify_request("pass-1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["hostname"], "example.test");
    assert_eq!(
        state.verification_cache.get_record_stats(CLIENT_IP).succeeded_attempts,
        1
    );
}

#[tokio::test]
async fn repeated_failures_end_in_block_response() {
    let router = router(test_state(None));

    for index in 0..5 {
        let (status, body) = call(&router, verify_request(&format!("bad-{index}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Verification failed");
        assert_eq!(body["details"]["error_codes"][0], "invalid-input-response");
    }

    let (status, body) = call(&router, verify_request("pass-after-block")).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(body["details"]["blocked"], true);
    assert_eq!(body["details"]["failed_attempts"], 5);
    assert!(body["details"]["block_until"].is_string());
}

#[tokio::test]
async fn exhausted_quota_returns_rate_limited_response() {
    let router = router(test_state(None));

    for index in 0..10 {
        let (status, _) = call(&router, verify_request(&format!("pass-{index}"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(&router, verify_request("pass-11")).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["details"]["rate_limited"], true);
    assert_eq!(body["details"]["recent_attempts"], 10);
    assert!(body["details"].get("blocked").is_none());
}

#[tokio::test]
async fn empty_token_is_rejected_without_counting() {
    let state = test_state(None);
    let router = router(state.clone());

    let (status, body) = call(&router, verify_request("   ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    assert_eq!(
        state.verification_cache.get_record_stats(CLIENT_IP).total_attempts,
        0
    );
}

#[tokio::test]
async fn oversized_page_name_is_rejected_without_counting() {
    let state = test_state(None);
    let router = router(state.clone());
    let request = Request::builder()
        .method("POST")
        .uri("/api/verify")
        .header("content-type", "application/json")
        .header("x-forwarded-for", CLIENT_IP)
        .body(Body::from(
            json!({ "token": "pass-1", "page": "p".repeat(256) }).to_string(),
        ))
        .unwrap_or_else(|_| unreachable!());

    let (status, body) = call(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    assert_eq!(
        state.verification_cache.get_record_stats(CLIENT_IP).total_attempts,
        0
    );
}

#[tokio::test]
async fn admin_routes_require_configured_token() {
    let router = router(test_state(Some(ADMIN_TOKEN)));
    let anonymous = Request::builder()
        .uri("/api/admin/cache/stats")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());

    let (anonymous_status, _) = call(&router, anonymous).await;
    let (status, body) = call(
        &router,
        admin_request("GET", "/api/admin/cache/stats", None),
    )
    .await;

    assert_eq!(anonymous_status, StatusCode::UNAUTHORIZED);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_records"], 0);
}

#[tokio::test]
async fn manual_block_and_unblock_drive_admission() {
    let router = router(test_state(Some(ADMIN_TOKEN)));

    let (status, body) = call(
        &router,
        admin_request(
            "POST",
            &format!("/api/admin/cache/block/{CLIENT_IP}"),
            Some(json!({ "duration_minutes": 30 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocked"], true);

    let (_, blocked) = call(
        &router,
        admin_request("GET", "/api/admin/cache/blocked", None),
    )
    .await;
    assert_eq!(blocked["count"], 1);
    assert_eq!(blocked["blocked"][0], CLIENT_IP);

    let (status, _) = call(&router, verify_request("pass-1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, body) = call(
        &router,
        admin_request("POST", &format!("/api/admin/cache/unblock/{CLIENT_IP}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["existed"], true);

    let (status, _) = call(&router, verify_request("pass-2")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = call(
        &router,
        admin_request("GET", &format!("/api/admin/cache/ip/{CLIENT_IP}"), None),
    )
    .await;
    assert_eq!(stats["total_attempts"], 1);
    assert_eq!(stats["is_blocked"], false);
}

#[tokio::test]
async fn manual_block_rejects_non_positive_duration() {
    let router = router(test_state(None));

    let (status, _) = call(
        &router,
        admin_request(
            "POST",
            "/api/admin/cache/block/10.0.0.1",
            Some(json!({ "duration_minutes": 0 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clearing_unknown_ip_reports_zero_stats() {
    let router = router(test_state(None));

    let (status, body) = call(
        &router,
        admin_request("DELETE", "/api/admin/cache/ip/10.9.9.9", None),
    )
    .await;
    let (_, stats) = call(
        &router,
        admin_request("GET", "/api/admin/cache/ip/10.9.9.9", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["existed"], false);
    assert_eq!(stats["total_attempts"], 0);
    assert_eq!(stats["block_until"], Value::Null);
}

#[tokio::test]
async fn metrics_list_logged_attempts_newest_first() {
    let router = router(test_state(None));
    call(&router, verify_request("pass-1")).await;
    call(&router, verify_request("bad-1")).await;

    let request = Request::builder()
        .uri("/api/metrics?limit=1")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());
    let (status, body) = call(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["metrics"][0]["success"], false);
    assert_eq!(body["metrics"][0]["device"], "mobile");
    assert_eq!(body["metrics"][0]["page"], "checkout");
    assert!(body.get("page").is_none());

    let second_page = Request::builder()
        .uri("/api/metrics?limit=1&offset=1")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());
    let (_, body) = call(&router, second_page).await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["metrics"][0]["success"], true);

    let successes = Request::builder()
        .uri("/api/metrics?success=true")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());
    let (_, body) = call(&router, successes).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["limit"], 50);
}

#[tokio::test]
async fn metrics_reject_malformed_dates() {
    let router = router(test_state(None));
    let request = Request::builder()
        .uri("/api/metrics?start_date=yesterday")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());

    let (status, _) = call(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
