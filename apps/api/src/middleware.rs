use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use veriguard_core::AppError;
use veriguard_domain::{AdmissionDecision, DenyReason};

use crate::client_context::ClientContext;
use crate::dto::{AdmissionDeniedDetails, AdmissionDeniedResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Refuses blocked or rate-limited callers before their token is verified.
///
/// Admitted requests carry their [`ClientContext`] as an extension.
pub async fn verification_blocker(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let client = ClientContext::resolve(request.headers(), request.extensions());

    match state.verification_cache.admit(&client.identity_key) {
        AdmissionDecision::Allow => {
            request.extensions_mut().insert(client);
            next.run(request).await
        }
        AdmissionDecision::Deny(reason) => denied_response(reason),
    }
}

fn denied_response(reason: DenyReason) -> Response {
    let body = match reason {
        DenyReason::Blocked {
            block_until,
            recent_failed,
        } => AdmissionDeniedResponse {
            success: false,
            error: "Too many verification attempts. Please try again later.".to_owned(),
            details: AdmissionDeniedDetails {
                blocked: Some(true),
                block_until: Some(block_until.to_rfc3339()),
                failed_attempts: Some(recent_failed),
                rate_limited: None,
                recent_attempts: None,
                message: format!(
                    "IP address has been temporarily blocked due to suspicious activity. Block expires at {}",
                    block_until.to_rfc3339()
                ),
            },
        },
        DenyReason::RateLimited { recent_attempts } => AdmissionDeniedResponse {
            success: false,
            error: "Rate limit exceeded. Please slow down your requests.".to_owned(),
            details: AdmissionDeniedDetails {
                blocked: None,
                block_until: None,
                failed_attempts: None,
                rate_limited: Some(true),
                recent_attempts: Some(recent_attempts),
                message: "Too many verification attempts in a short time. Please wait before trying again."
                    .to_owned(),
            },
        },
    };

    (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
}

/// Requires `Authorization: Bearer <ADMIN_API_TOKEN>` when a token is configured.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if let Some(expected) = state.admin_api_token.as_deref() {
        let presented = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        if !presented.is_some_and(|token| constant_time_eq(token.as_bytes(), expected.as_bytes()))
        {
            return Err(AppError::Unauthorized("admin token required".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0_u8, |acc, (left, right)| acc | (left ^ right))
            == 0
}
