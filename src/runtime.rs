//! Client side of the container runtime API.
//!
//! The exporter consumes exactly two calls, captured by [`ContainerRuntime`]:
//! listing the running containers and fetching a one-shot statistics snapshot
//! for a single container. [`DockerClient`] implements them against the Docker
//! Engine API over a Unix socket or TCP.
mod docker;
mod error;
mod models;
mod transport;

pub use docker::{DEFAULT_API_VERSION, DockerClient};
pub use error::{Error, Result};
pub use models::{ContainerSummary, CpuStats, CpuUsage, MemoryStats, StatsSnapshot};
pub use transport::Endpoint;

use crate::container::ContainerID;

/// The two container runtime calls a scrape depends on.
pub trait ContainerRuntime {
    /// Lists the currently running containers.
    fn list_containers(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ContainerSummary>>> + Send;

    /// Fetches a single, non-streaming statistics snapshot for `container_id`.
    fn container_stats(
        &self,
        container_id: &ContainerID,
    ) -> impl std::future::Future<Output = Result<StatsSnapshot>> + Send;
}
