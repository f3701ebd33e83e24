use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use veriguard_core::AppError;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

#[cfg(test)]
mod tests;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let verify_routes = Router::new()
        .route(
            "/api/verify",
            post(handlers::verification::verify_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::verification_blocker,
        ));

    let admin_routes = Router::new()
        .route(
            "/api/admin/cache/stats",
            get(handlers::admin::cache_stats_handler),
        )
        .route(
            "/api/admin/cache/blocked",
            get(handlers::admin::blocked_ips_handler),
        )
        .route(
            "/api/admin/cache/ip/{ip}",
            get(handlers::admin::ip_stats_handler).delete(handlers::admin::clear_ip_handler),
        )
        .route(
            "/api/admin/cache/block/{ip}",
            post(handlers::admin::block_ip_handler),
        )
        .route(
            "/api/admin/cache/unblock/{ip}",
            post(handlers::admin::unblock_ip_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_admin_token,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/metrics",
            get(handlers::verification::metrics_handler),
        )
        .merge(verify_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
