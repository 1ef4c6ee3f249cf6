//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{get_task_status, get_video, health, list_videos, process_playlist, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    ClientRateLimiter,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Trailing-slash forms are kept for existing clients.
    let mut api_routes = Router::new()
        .route("/process", post(process_playlist))
        .route("/process/", post(process_playlist))
        .route("/status/:task_id", get(get_task_status))
        .route("/videos", get(list_videos))
        .route("/videos/", get(list_videos))
        .route("/videos/:video_id", get(get_video));

    if let Some(limiter) = ClientRateLimiter::new(state.config.rate_limit_rps) {
        api_routes = api_routes.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
