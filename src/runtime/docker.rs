use http_body_util::Empty;
use hyper::body::Bytes;
use hyper::{Method, Request, header};
use serde::de::DeserializeOwned;

use crate::container::ContainerID;

use super::models::{ContainerSummary, StatsSnapshot};
use super::{ContainerRuntime, Endpoint, Error, Result};

/// Engine API version requested when none is configured.
pub const DEFAULT_API_VERSION: &str = "1.41";

#[derive(Debug, serde::Deserialize)]
struct ErrorMessage {
    message: String,
}

/// A minimal Docker Engine API client.
///
/// Every call opens its own connection to the engine, so a client can be
/// shared freely between concurrent scrapes.
#[derive(Debug, Clone)]
pub struct DockerClient {
    endpoint: Endpoint,
    api_version: String,
}

impl DockerClient {
    /// Creates a client for the engine at `endpoint`, pinned to `api_version` (e.g. `"1.41"`).
    pub fn new(endpoint: Endpoint, api_version: impl Into<String>) -> Self {
        Self {
            endpoint,
            api_version: api_version.into(),
        }
    }

    fn request(&self, path: &str) -> Result<Request<Empty<Bytes>>> {
        let path = format!("/v{}{}", self.api_version, path);
        Request::builder()
            .method(Method::GET)
            .uri(path.as_str())
            .header(header::HOST, "docker")
            .header(header::ACCEPT, "application/json")
            .body(Empty::new())
            .map_err(|source| Error::InvalidRequest { path, source })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &'static str) -> Result<T> {
        let response = self.endpoint.send(self.request(path)?).await?;
        let status = response.status();
        let body = response.into_body();

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorMessage>(&body)
                .map(|err| err.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_owned());
            return Err(Error::Status { status, message });
        }

        serde_json::from_slice(&body).map_err(|source| Error::Decode { what, source })
    }
}

impl ContainerRuntime for DockerClient {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        self.get_json("/containers/json", "container list").await
    }

    async fn container_stats(&self, container_id: &ContainerID) -> Result<StatsSnapshot> {
        self.get_json(
            &format!("/containers/{}/stats?stream=false", container_id),
            "container stats",
        )
        .await
    }
}
