use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use chrono::Duration;
use veriguard_core::AppError;

use crate::dto::{
    BlockIpRequest, BlockedIpsResponse, CacheStatsResponse, IpActionResponse, IpStatsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(state.verification_cache.get_cache_stats().into())
}

pub async fn blocked_ips_handler(State(state): State<AppState>) -> Json<BlockedIpsResponse> {
    let blocked = state.verification_cache.get_blocked_ips();

    Json(BlockedIpsResponse {
        count: blocked.len(),
        blocked,
    })
}

pub async fn ip_stats_handler(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> Json<IpStatsResponse> {
    let stats = state.verification_cache.get_record_stats(&ip);
    Json(IpStatsResponse::new(ip, stats))
}

pub async fn block_ip_handler(
    State(state): State<AppState>,
    Path(ip): Path<String>,
    body: Bytes,
) -> ApiResult<Json<IpActionResponse>> {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        BlockIpRequest::default()
    } else {
        serde_json::from_slice::<BlockIpRequest>(&body)
            .map_err(|error| AppError::Validation(format!("invalid block request: {error}")))?
    };
    let duration = payload
        .duration_minutes
        .map(|minutes| {
            if minutes <= 0 {
                return Err(AppError::Validation(
                    "duration_minutes must be a positive integer".to_owned(),
                ));
            }
            Duration::try_minutes(minutes).ok_or_else(|| {
                AppError::Validation("duration_minutes is out of range".to_owned())
            })
        })
        .transpose()?;

    let block_until = state.verification_cache.block_ip(&ip, duration);

    Ok(Json(IpActionResponse {
        message: format!("IP {ip} has been blocked"),
        ip,
        blocked: true,
        block_until: Some(block_until.to_rfc3339()),
        existed: true,
    }))
}

pub async fn unblock_ip_handler(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> Json<IpActionResponse> {
    let existed = state.verification_cache.unblock_ip(&ip);

    Json(IpActionResponse {
        message: format!("IP {ip} has been unblocked"),
        ip,
        blocked: false,
        block_until: None,
        existed,
    })
}

pub async fn clear_ip_handler(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> Json<IpActionResponse> {
    let existed = state.verification_cache.clear_record(&ip);

    Json(IpActionResponse {
        message: format!("Record for IP {ip} has been cleared"),
        ip,
        blocked: false,
        block_until: None,
        existed,
    })
}
