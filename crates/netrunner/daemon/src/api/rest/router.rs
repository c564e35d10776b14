//! API Router configuration

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;
use crate::config::ServerConfig;

/// Create the main API router
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let bounded = Router::new()
        .route("/v1/ping", post(handlers::ping))
        .route("/v1/orchestrator/create", post(handlers::create_network))
        .route("/v1/network/getNodes", post(handlers::get_nodes))
        .route("/v1/network/getNode", post(handlers::get_node))
        .route("/v1/network/add", post(handlers::add_node))
        .route("/v1/network/teardown", post(handlers::teardown))
        .route("/v1/network/stop", post(handlers::stop_node))
        .route("/health", get(handlers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )));

    // awaitHealthy carries its own deadline.
    let unbounded = Router::new().route("/v1/network/awaitHealthy", post(handlers::await_healthy));

    let mut router = bounded
        .merge(unbounded)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
