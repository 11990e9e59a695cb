//! Translation of container runtime statistics into Prometheus gauges.
//!
//! # Key Components
//!
//! - [`MetricDescriptor`]: The two static metric descriptors, [`CPU_USAGE_PERCENT`]
//!   and [`MEMORY_USAGE_BYTES`].
//! - [`DerivedMetrics`]: CPU percentage and working-set memory derived from one snapshot.
//! - [`DockerCollector`]: Implements [`prometheus::core::Collector`]; runs one scrape
//!   per `collect` call and publishes two gauges per container.
mod collector;
mod derive;
mod descriptors;

pub use collector::{ContainerMetrics, DockerCollector};
pub use derive::{DerivedMetrics, cpu_percent, memory_bytes};
pub use descriptors::{
    CONTAINER_ID_LABEL, CPU_USAGE_PERCENT, MEMORY_USAGE_BYTES, MetricDescriptor, NAMESPACE,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid metric descriptor `{name}`: {source}")]
    Descriptor {
        name: String,
        #[source]
        source: prometheus::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
