use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing::warn;
use tracing_subscriber::EnvFilter;
use veriguard_application::{ConfigCorrection, VerificationCacheConfig, VerificationCacheSettings};
use veriguard_core::AppError;
use veriguard_infrastructure::DEFAULT_TURNSTILE_VERIFY_URL;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub turnstile_secret_key: Option<String>,
    pub turnstile_verify_url: String,
    pub admin_api_token: Option<String>,
    pub cache_config: VerificationCacheConfig,
    pub cache_config_corrections: Vec<ConfigCorrection>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = optional_non_empty_env("DATABASE_URL");
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let turnstile_secret_key = optional_non_empty_env("CLOUDFLARE_SECRET_KEY");
        let turnstile_verify_url = optional_non_empty_env("TURNSTILE_VERIFY_URL")
            .unwrap_or_else(|| DEFAULT_TURNSTILE_VERIFY_URL.to_owned());
        let admin_api_token = optional_non_empty_env("ADMIN_API_TOKEN");

        let (cache_config, cache_config_corrections) =
            VerificationCacheConfig::from_settings(&cache_settings_from_env());

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            turnstile_secret_key,
            turnstile_verify_url,
            admin_api_token,
            cache_config,
            cache_config_corrections,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    /// Logs every setting that could not be honoured as given.
    pub fn report_warnings(&self) {
        for correction in &self.cache_config_corrections {
            warn!(
                field = correction.field,
                raw_value = %correction.raw_value,
                applied_default = %correction.applied_default,
                "invalid verification cache setting replaced by default"
            );
        }

        if self.turnstile_secret_key.is_none() {
            warn!("CLOUDFLARE_SECRET_KEY is not set; every verification will fail");
        }
        if self.admin_api_token.is_none() {
            warn!("ADMIN_API_TOKEN is not set; admin cache routes are unauthenticated");
        }
    }
}

fn cache_settings_from_env() -> VerificationCacheSettings {
    cache_settings_from_lookup(|name| env::var(name).ok())
}

fn cache_settings_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> VerificationCacheSettings {
    VerificationCacheSettings {
        max_attempts_per_window: lookup("VERIFICATION_MAX_ATTEMPTS"),
        window_minutes: lookup("VERIFICATION_TIME_WINDOW"),
        max_failed_attempts: lookup("VERIFICATION_MAX_FAILED"),
        block_duration_minutes: lookup("VERIFICATION_BLOCK_DURATION"),
        manual_block_duration_minutes: lookup("VERIFICATION_MANUAL_BLOCK_DURATION"),
        cleanup_interval_minutes: lookup("VERIFICATION_CLEANUP_INTERVAL"),
        retention_multiplier: lookup("VERIFICATION_RETENTION_MULTIPLIER"),
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
