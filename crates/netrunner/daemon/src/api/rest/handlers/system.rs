//! Ping and daemon health handlers

use axum::{extract::State, Json};
use netrunner_types::api::{HealthCheckResponse, PingRequest, PingResponse};

use crate::api::rest::state::AppState;

pub async fn ping(Json(_): Json<PingRequest>) -> Json<PingResponse> {
    tracing::debug!("Received ping request");
    Json(PingResponse {
        pid: std::process::id(),
    })
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        networks: state.orchestrator.network_names().len(),
    })
}
