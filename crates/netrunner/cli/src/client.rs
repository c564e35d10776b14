//! HTTP client for the netrunner daemon

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use netrunner_types::api::{
    AddNodeRequest, AddNodeResponse, AwaitHealthyRequest, AwaitHealthyResponse,
    CreateNetworkRequest, CreateNetworkResponse, ErrorResponse, GetNodeRequest,
    GetNodeResponse, GetNodesRequest, GetNodesResponse, HealthCheckResponse, NodeStopRequest,
    NodeStopResponse, PingRequest, PingResponse, TeardownRequest, TeardownResponse,
};
use netrunner_types::{NodeConfig, NodeInfo};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CliError, CliResult};

/// Connect timeout used when none is given.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for communicating with the netrunner daemon
pub struct NetrunnerClient {
    client: Client,
    base_url: String,
}

impl NetrunnerClient {
    /// Create a client. `request_timeout` of `None` leaves requests
    /// unbounded, which `await_healthy` relies on.
    pub fn new(
        endpoint: &str,
        dial_timeout: Duration,
        request_timeout: Option<Duration>,
    ) -> CliResult<Self> {
        let mut builder = Client::builder().connect_timeout(dial_timeout);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Check daemon health
    pub async fn health_check(&self) -> CliResult<HealthCheckResponse> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    pub async fn ping(&self) -> CliResult<u32> {
        let resp: PingResponse = self.post("/v1/ping", &PingRequest {}).await?;
        Ok(resp.pid)
    }

    pub async fn create_network(&self, network: &str) -> CliResult<()> {
        let _: CreateNetworkResponse = self
            .post(
                "/v1/orchestrator/create",
                &CreateNetworkRequest {
                    network: network.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    pub async fn get_nodes(&self, network: &str) -> CliResult<Vec<NodeInfo>> {
        let resp: GetNodesResponse = self
            .post(
                "/v1/network/getNodes",
                &GetNodesRequest {
                    network: network.to_string(),
                },
            )
            .await?;
        Ok(resp.nodes)
    }

    pub async fn get_node(&self, network: &str, name: &str) -> CliResult<NodeInfo> {
        let resp: GetNodeResponse = self
            .post(
                "/v1/network/getNode",
                &GetNodeRequest {
                    network: network.to_string(),
                    name: name.to_string(),
                },
            )
            .await?;
        Ok(resp.node)
    }

    /// Launch a node; the config travels as base64-encoded JSON.
    pub async fn add_node(&self, network: &str, config: &NodeConfig) -> CliResult<NodeInfo> {
        let bytes = config
            .to_json_bytes()
            .map_err(|e| CliError::InvalidInput(e.to_string()))?;
        let resp: AddNodeResponse = self
            .post(
                "/v1/network/add",
                &AddNodeRequest {
                    network: network.to_string(),
                    config: STANDARD.encode(bytes),
                },
            )
            .await?;
        Ok(resp.node)
    }

    pub async fn teardown(&self, network: &str) -> CliResult<()> {
        let _: TeardownResponse = self
            .post(
                "/v1/network/teardown",
                &TeardownRequest {
                    network: network.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    /// Stop one node; a zero timeout selects the daemon's default.
    pub async fn stop_node(&self, network: &str, name: &str, timeout_secs: u64) -> CliResult<()> {
        let _: NodeStopResponse = self
            .post(
                "/v1/network/stop",
                &NodeStopRequest {
                    network: network.to_string(),
                    name: name.to_string(),
                    timeout: timeout_secs,
                },
            )
            .await?;
        Ok(())
    }

    pub async fn await_healthy(
        &self,
        network: &str,
        poll_interval_ms: Option<u64>,
        timeout_secs: Option<u64>,
    ) -> CliResult<()> {
        let _: AwaitHealthyResponse = self
            .post(
                "/v1/network/awaitHealthy",
                &AwaitHealthyRequest {
                    network: network.to_string(),
                    poll_interval_ms,
                    timeout_secs,
                },
            )
            .await?;
        Ok(())
    }

    // ========== Internal HTTP helpers ==========

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> CliResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> CliResult<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(err) => (err.code, err.error),
            Err(_) => (String::new(), text),
        };

        if status == StatusCode::NOT_FOUND {
            Err(CliError::NotFound(message))
        } else {
            Err(CliError::Api {
                status: status.as_u16(),
                code,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_endpoint_normalization() {
        let client =
            NetrunnerClient::new("http://localhost:8081/", DEFAULT_DIAL_TIMEOUT, None).unwrap();
        assert_eq!(client.base_url, "http://localhost:8081");
    }

    #[tokio::test]
    async fn test_unreachable_daemon_is_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = NetrunnerClient::new(
            &format!("http://127.0.0.1:{}", port),
            Duration::from_millis(500),
            Some(Duration::from_secs(1)),
        )
        .unwrap();
        assert!(matches!(client.ping().await, Err(CliError::Http(_))));
    }
}
