use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use veriguard_application::{VerificationLogQuery, VerificationRequest};
use veriguard_core::{AppError, NonEmptyString};

use crate::client_context::ClientContext;
use crate::dto::{MetricsQuery, MetricsResponse, VerifyRequest, VerifyResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Longest page name accepted on a verification request.
const MAX_PAGE_LENGTH: usize = 255;

pub async fn verify_handler(
    State(state): State<AppState>,
    Extension(client): Extension<ClientContext>,
    Json(payload): Json<VerifyRequest>,
) -> ApiResult<(StatusCode, Json<VerifyResponse>)> {
    let token = NonEmptyString::new(payload.token)
        .map_err(|_| AppError::Validation("token is required".to_owned()))?;
    let page = payload.page.filter(|page| !page.trim().is_empty());
    if page
        .as_deref()
        .is_some_and(|page| page.chars().count() > MAX_PAGE_LENGTH)
    {
        return Err(AppError::Validation(format!(
            "page must be at most {MAX_PAGE_LENGTH} characters"
        ))
        .into());
    }

    let outcome = state
        .verification_service
        .verify_and_log(VerificationRequest {
            token,
            page,
            identity_key: client.identity_key,
            remote_ip: client.ip_address,
            user_agent: client.user_agent,
        })
        .await;

    let status = if outcome.verification.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    Ok((
        status,
        Json(VerifyResponse::from_verification(outcome.verification)),
    ))
}

pub async fn metrics_handler(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<Json<MetricsResponse>> {
    let paginated = query.offset.is_some() && query.limit.is_some();
    let page = state
        .verification_service
        .list_log_entries(VerificationLogQuery {
            start_date: parse_timestamp("start_date", query.start_date.as_deref())?,
            end_date: parse_timestamp("end_date", query.end_date.as_deref())?,
            success: query.success,
            page: query.page.filter(|page| !page.trim().is_empty()),
            limit: query.limit.unwrap_or_default(),
            offset: query.offset.unwrap_or_default(),
        })
        .await?;

    Ok(Json(MetricsResponse::from_page(page, paginated)))
}

fn parse_timestamp(name: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            DateTime::parse_from_rfc3339(value.trim())
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|error| {
                    AppError::Validation(format!("{name} must be an RFC 3339 timestamp: {error}"))
                })
        })
        .transpose()
}
