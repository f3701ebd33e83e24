use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use veriguard_application::{TokenVerification, TokenVerifier};
use veriguard_core::{AppError, AppResult};

/// Cloudflare Turnstile siteverify endpoint.
pub const DEFAULT_TURNSTILE_VERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Error code reported when no secret key is configured.
const MISSING_SECRET_CODE: &str = "missing-input-secret";

/// Token verifier backed by the Cloudflare Turnstile siteverify API.
#[derive(Clone)]
pub struct TurnstileTokenVerifier {
    http_client: reqwest::Client,
    verify_url: String,
    secret_key: Option<String>,
}

impl TurnstileTokenVerifier {
    /// Creates a verifier. Without a secret key every token is rejected
    /// locally with `missing-input-secret`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        verify_url: impl Into<String>,
        secret_key: Option<String>,
    ) -> Self {
        Self {
            http_client,
            verify_url: verify_url.into(),
            secret_key: secret_key.filter(|value| !value.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
    challenge_ts: Option<String>,
    hostname: Option<String>,
    action: Option<String>,
    cdata: Option<String>,
}

impl From<SiteverifyResponse> for TokenVerification {
    fn from(value: SiteverifyResponse) -> Self {
        Self {
            success: value.success,
            challenge_ts: value.challenge_ts,
            hostname: value.hostname,
            error_codes: value.error_codes,
            action: value.action,
            cdata: value.cdata,
        }
    }
}

#[async_trait]
impl TokenVerifier for TurnstileTokenVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> AppResult<TokenVerification> {
        let Some(secret_key) = self.secret_key.as_deref() else {
            return Ok(TokenVerification::failed([MISSING_SECRET_CODE]));
        };

        let mut form = vec![("secret", secret_key), ("response", token)];
        if let Some(remote_ip) = remote_ip {
            form.push(("remoteip", remote_ip));
        }

        let response = self
            .http_client
            .post(self.verify_url.as_str())
            .form(&form)
            .send()
            .await
            .map_err(|error| AppError::Unavailable(format!("siteverify request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Unavailable(format!(
                "siteverify returned status {status}"
            )));
        }

        let body = response
            .json::<SiteverifyResponse>()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("siteverify returned an invalid body: {error}"))
            })?;

        debug!(success = body.success, "siteverify answered");
        Ok(body.into())
    }
}
