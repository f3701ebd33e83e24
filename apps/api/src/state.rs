use veriguard_application::{VerificationCacheService, VerificationService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verification_cache: VerificationCacheService,
    pub verification_service: VerificationService,
    pub admin_api_token: Option<String>,
}
