//! Veriguard API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod client_context;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use veriguard_application::{
    VerificationCacheService, VerificationLogRepository, VerificationService,
};
use veriguard_core::AppError;
use veriguard_infrastructure::{
    CacheSweeper, InMemoryVerificationLogRepository, InMemoryVerificationRecordStore,
    PostgresVerificationLogRepository, SystemClock, TurnstileTokenVerifier, run_migrations,
};

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    config.report_warnings();

    let pool = match config.database_url.as_deref() {
        Some(database_url) => Some(connect_and_migrate(database_url).await?),
        None => None,
    };

    if config.migrate_only {
        if pool.is_some() {
            info!("database migrations applied successfully");
        } else {
            warn!("DATABASE_URL is not set; no migrations to apply");
        }
        return Ok(());
    }

    let log_repository: Arc<dyn VerificationLogRepository> = match pool {
        Some(pool) => Arc::new(PostgresVerificationLogRepository::new(pool)),
        None => {
            info!("DATABASE_URL is not set; verification log kept in memory");
            Arc::new(InMemoryVerificationLogRepository::new())
        }
    };

    let verification_cache = VerificationCacheService::new(
        config.cache_config.clone(),
        Arc::new(InMemoryVerificationRecordStore::new()),
        Arc::new(SystemClock),
    );
    let token_verifier = Arc::new(TurnstileTokenVerifier::new(
        reqwest::Client::new(),
        config.turnstile_verify_url.clone(),
        config.turnstile_secret_key.clone(),
    ));
    let verification_service = VerificationService::new(
        token_verifier,
        log_repository,
        verification_cache.clone(),
    );

    let sweeper = CacheSweeper::start(
        verification_cache.clone(),
        config.cache_config.cleanup_interval_std(),
    );

    let app_state = AppState {
        verification_cache: verification_cache.clone(),
        verification_service,
        admin_api_token: config.admin_api_token.clone(),
    };
    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "veriguard-api listening");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_shutdown_signal())
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    sweeper.stop().await;
    verification_cache.shutdown();

    served
}

async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("ctrl-c received; shutting down"),
                    _ = terminate.recv() => info!("SIGTERM received; shutting down"),
                }
            }
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                info!("ctrl-c received; shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("ctrl-c received; shutting down");
    }
}
