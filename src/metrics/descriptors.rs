use std::collections::HashMap;

use prometheus::core::Desc;
use prometheus::{GaugeVec, Opts};

use super::{Error, Result};

/// Namespace prefixed to every exported metric name.
pub const NAMESPACE: &str = "docker_exporter";

/// The only label carried by exported samples.
pub const CONTAINER_ID_LABEL: &str = "container_id";

/// Name and help text of one exported gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
}

pub const CPU_USAGE_PERCENT: MetricDescriptor = MetricDescriptor {
    name: "cpu_usage_percent",
    help: "Container CPU Usage Percentage",
};

pub const MEMORY_USAGE_BYTES: MetricDescriptor = MetricDescriptor {
    name: "memory_usage_bytes",
    help: "Container Memory Usage in bytes",
};

impl MetricDescriptor {
    /// Returns the namespace-qualified metric name, e.g. `docker_exporter_cpu_usage_percent`.
    pub fn fq_name(&self) -> String {
        format!("{}_{}", NAMESPACE, self.name)
    }

    /// Builds the Prometheus descriptor handed out by `describe`.
    pub fn desc(&self) -> Result<Desc> {
        Desc::new(
            self.fq_name(),
            self.help.to_owned(),
            vec![CONTAINER_ID_LABEL.to_owned()],
            HashMap::new(),
        )
        .map_err(|source| self.error(source))
    }

    /// Builds an empty gauge vector for one scrape's samples.
    pub(super) fn gauge_vec(&self) -> Result<GaugeVec> {
        GaugeVec::new(Opts::new(self.fq_name(), self.help), &[CONTAINER_ID_LABEL])
            .map_err(|source| self.error(source))
    }

    fn error(&self, source: prometheus::Error) -> Error {
        Error::Descriptor {
            name: self.fq_name(),
            source,
        }
    }
}
