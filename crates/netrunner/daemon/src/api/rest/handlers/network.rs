//! Orchestrator and network handlers

use std::time::Duration;

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use netrunner_backend::NodeHandle;
use netrunner_health::await_healthy_within;
use netrunner_types::api::{
    AddNodeRequest, AddNodeResponse, AwaitHealthyRequest, AwaitHealthyResponse,
    CreateNetworkRequest, CreateNetworkResponse, GetNodeRequest, GetNodeResponse,
    GetNodesRequest, GetNodesResponse, NodeStopRequest, NodeStopResponse, TeardownRequest,
    TeardownResponse,
};
use netrunner_types::{NodeConfig, NodeInfo};
use tracing::info;

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};

fn node_info(node: &NodeHandle) -> ApiResult<NodeInfo> {
    node.info()
        .map_err(|e| ApiError::Internal(format!("failed to encode node config: {}", e)))
}

fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

/// Create a network
pub async fn create_network(
    State(state): State<AppState>,
    Json(req): Json<CreateNetworkRequest>,
) -> ApiResult<Json<CreateNetworkResponse>> {
    require("network", &req.network)?;
    info!(network = %req.network, "Received create network request");

    state.orchestrator.create_network(&req.network).await?;
    Ok(Json(CreateNetworkResponse {}))
}

/// List the nodes of a network
pub async fn get_nodes(
    State(state): State<AppState>,
    Json(req): Json<GetNodesRequest>,
) -> ApiResult<Json<GetNodesResponse>> {
    let network = state.network(&req.network)?;
    let nodes = network
        .get_nodes()
        .iter()
        .map(node_info)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(GetNodesResponse { nodes }))
}

/// Get a single node
pub async fn get_node(
    State(state): State<AppState>,
    Json(req): Json<GetNodeRequest>,
) -> ApiResult<Json<GetNodeResponse>> {
    require("name", &req.name)?;
    let network = state.network(&req.network)?;
    let node = network.get_node(&req.name).ok_or_else(|| {
        ApiError::NotFound(format!(
            "node {} not found in network {}",
            req.name, req.network
        ))
    })?;
    Ok(Json(GetNodeResponse {
        node: node_info(&node)?,
    }))
}

/// Launch a node from a base64 JSON node config
pub async fn add_node(
    State(state): State<AppState>,
    Json(req): Json<AddNodeRequest>,
) -> ApiResult<Json<AddNodeResponse>> {
    let network = state.network(&req.network)?;

    let bytes = STANDARD
        .decode(req.config.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("config is not valid base64: {}", e)))?;
    let config = NodeConfig::from_json_bytes(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid node config: {}", e)))?;
    info!(network = %req.network, node = %config.name, "Received add node request");

    let node = network.add_node(config).await?;
    Ok(Json(AddNodeResponse {
        node: node_info(&node)?,
    }))
}

/// Tear a network down and drop it from the registry
pub async fn teardown(
    State(state): State<AppState>,
    Json(req): Json<TeardownRequest>,
) -> ApiResult<Json<TeardownResponse>> {
    require("network", &req.network)?;
    info!(network = %req.network, "Received teardown request");

    state.orchestrator.teardown_network(&req.network).await?;
    Ok(Json(TeardownResponse {}))
}

/// Stop one node
pub async fn stop_node(
    State(state): State<AppState>,
    Json(req): Json<NodeStopRequest>,
) -> ApiResult<Json<NodeStopResponse>> {
    require("name", &req.name)?;
    let network = state.network(&req.network)?;
    let timeout = match req.timeout {
        0 => state.stop_timeout,
        secs => Duration::from_secs(secs),
    };
    info!(network = %req.network, node = %req.name, timeout_secs = timeout.as_secs(), "Received node stop request");

    network.stop_node(&req.name, timeout).await?;
    Ok(Json(NodeStopResponse {}))
}

/// Block until every node of the network is healthy
pub async fn await_healthy(
    State(state): State<AppState>,
    Json(req): Json<AwaitHealthyRequest>,
) -> ApiResult<Json<AwaitHealthyResponse>> {
    let network = state.network(&req.network)?;
    let poll_interval = req
        .poll_interval_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(state.poll_interval);
    let timeout = req
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(state.health_timeout);

    await_healthy_within(&network, state.probe.as_ref(), poll_interval, timeout).await?;
    Ok(Json(AwaitHealthyResponse {}))
}
