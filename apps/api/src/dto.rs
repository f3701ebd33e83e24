use serde::Serialize;
use ts_rs::TS;

mod admin;
mod verification;

pub use admin::{
    BlockIpRequest, BlockedIpsResponse, CacheStatsResponse, IpActionResponse, IpStatsResponse,
};
pub use verification::{
    AdmissionDeniedDetails, AdmissionDeniedResponse, MetricsQuery, MetricsResponse,
    VerifyRequest, VerifyResponse,
};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}
