//! Docker Exporter: exposes per-container CPU and memory usage of a Docker host
//! in the Prometheus text format.
//!
//! Every scrape of `/metrics` lists the running containers through the Docker
//! Engine API, fetches one stats snapshot per container, and publishes two
//! gauges per container labelled with its `container_id`. Nothing is stored
//! between scrapes.

pub mod api;
pub mod config;
pub mod container;
pub mod error;
pub mod metrics;
pub mod runtime;

use config::Config;

/// Runs the exporter until Ctrl-C is received.
///
/// Connects the collector to the container runtime described by `config`,
/// registers it with a fresh Prometheus registry and serves that registry.
///
/// # Errors
///
/// Possible errors include:
/// - Failure to build the metric descriptors.
/// - Failure to bind the listen address.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    log::debug!(
        "Using container runtime at {} (API v{})",
        config.endpoint,
        config.api_version
    );
    let client = runtime::DockerClient::new(config.endpoint, config.api_version);
    let collector = metrics::DockerCollector::new(
        client,
        tokio::runtime::Handle::current(),
        config.scrape_timeout,
    )?;

    let registry = prometheus::Registry::new();
    registry.register(Box::new(collector))?;

    api::APIServer::new(registry)
        .listen(config.listen_addr)
        .await?;

    Ok(())
}
