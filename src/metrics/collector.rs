use std::time::Duration;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use tokio::time::Instant;

use crate::container::ContainerID;
use crate::error::ResultOkLogExt;
use crate::runtime::{self, ContainerRuntime};

use super::Result;
use super::derive::DerivedMetrics;
use super::descriptors::{CPU_USAGE_PERCENT, MEMORY_USAGE_BYTES};

const LOG_TARGET: &str = "docker collector";

/// Metrics derived for one container during a scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerMetrics {
    container_id: ContainerID,
    metrics: DerivedMetrics,
}

impl ContainerMetrics {
    pub fn new(container_id: ContainerID, metrics: DerivedMetrics) -> Self {
        Self {
            container_id,
            metrics,
        }
    }

    pub fn container_id(&self) -> &ContainerID {
        &self.container_id
    }

    pub fn cpu_percent(&self) -> f64 {
        self.metrics.cpu_percent
    }

    pub fn memory_bytes(&self) -> u64 {
        self.metrics.memory_bytes
    }
}

/// Collects per-container CPU and memory gauges from a container runtime on every scrape.
///
/// Nothing is cached between scrapes: each call to [`Collector::collect`] lists the
/// running containers, fetches one stats snapshot per container, and publishes
/// fresh gauges. A container whose snapshot cannot be fetched or decoded is left
/// out of that scrape; only a failure to list containers empties the scrape.
#[derive(Debug)]
pub struct DockerCollector<R> {
    runtime: R,
    handle: tokio::runtime::Handle,
    timeout: Option<Duration>,
    descs: Vec<Desc>,
}

impl<R: ContainerRuntime> DockerCollector<R> {
    /// Creates a collector backed by `runtime`.
    ///
    /// # Arguments
    ///
    /// * `runtime` - The container runtime to query.
    /// * `handle` - The Tokio runtime the queries are driven on.
    /// * `timeout` - Per-scrape deadline. `None` waits for every call to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric descriptors cannot be built.
    pub fn new(
        runtime: R,
        handle: tokio::runtime::Handle,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self {
            runtime,
            handle,
            timeout,
            descs: vec![CPU_USAGE_PERCENT.desc()?, MEMORY_USAGE_BYTES.desc()?],
        })
    }

    /// Runs one scrape against the container runtime.
    ///
    /// Containers are queried one after another. When the deadline passes, the
    /// metrics gathered so far are returned.
    pub async fn scrape(&self) -> Vec<ContainerMetrics> {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        let containers = match within(deadline, self.runtime.list_containers()).await {
            Ok(containers) => containers,
            Err(err) => {
                log::error!(target: LOG_TARGET, "failed to list containers: {}", err);
                return Vec::new();
            }
        };
        let total = containers.len();
        log::trace!(target: LOG_TARGET, "found {} running containers", total);

        let mut out = Vec::with_capacity(total);
        for container in containers {
            let Some(container_id) =
                ContainerID::new(&container.id).ok_log("skipping container listed by runtime")
            else {
                continue;
            };

            match within(deadline, self.runtime.container_stats(&container_id)).await {
                Ok(snapshot) => out.push(ContainerMetrics::new(
                    container_id,
                    DerivedMetrics::from_snapshot(&snapshot),
                )),
                Err(runtime::Error::Timeout) => {
                    log::warn!(
                        target: LOG_TARGET,
                        "scrape deadline exceeded at container_id={}, publishing {} of {} containers",
                        container_id,
                        out.len(),
                        total
                    );
                    break;
                }
                Err(err) => {
                    log::warn!(
                        target: LOG_TARGET,
                        "failed to get metrics for container: container_id={}, error={}",
                        container_id,
                        err
                    );
                }
            }
        }

        out
    }

    /// Turns the scraped metrics into one gauge family per descriptor.
    fn publish(&self, metrics: &[ContainerMetrics]) -> Result<Vec<MetricFamily>> {
        let cpu = CPU_USAGE_PERCENT.gauge_vec()?;
        let memory = MEMORY_USAGE_BYTES.gauge_vec()?;

        for entry in metrics {
            let labels = [entry.container_id().as_ref()];
            cpu.with_label_values(&labels).set(entry.cpu_percent());
            memory
                .with_label_values(&labels)
                .set(entry.memory_bytes() as f64);
        }

        let mut families = cpu.collect();
        families.extend(memory.collect());
        Ok(families)
    }
}

impl<R> Collector for DockerCollector<R>
where
    R: ContainerRuntime + Send + Sync,
{
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    /// Blocks on a full scrape.
    ///
    /// Must not be called from within an async context; gather the registry on
    /// a blocking thread instead.
    fn collect(&self) -> Vec<MetricFamily> {
        let metrics = self.handle.block_on(self.scrape());
        self.publish(&metrics)
            .map_err(|err| {
                log::error!(target: LOG_TARGET, "failed to publish metrics: {}", err);
            })
            .unwrap_or_default()
    }
}

async fn within<T>(
    deadline: Option<Instant>,
    call: impl Future<Output = runtime::Result<T>>,
) -> runtime::Result<T> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, call)
            .await
            .map_err(|_| runtime::Error::Timeout)?,
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use prometheus::{Encoder, Registry, TextEncoder};

    use super::*;
    use crate::runtime::{ContainerSummary, StatsSnapshot};

    #[derive(Debug, Default)]
    struct FakeRuntime {
        list_fails: bool,
        containers: Vec<&'static str>,
        stats: HashMap<&'static str, StatsSnapshot>,
        stall: Option<&'static str>,
        delay: Option<Duration>,
    }

    impl ContainerRuntime for FakeRuntime {
        async fn list_containers(&self) -> runtime::Result<Vec<ContainerSummary>> {
            if self.list_fails {
                return Err(runtime::Error::InvalidEndpoint("unreachable".to_owned()));
            }
            Ok(self
                .containers
                .iter()
                .map(|id| ContainerSummary {
                    id: (*id).to_owned(),
                })
                .collect())
        }

        async fn container_stats(
            &self,
            container_id: &ContainerID,
        ) -> runtime::Result<StatsSnapshot> {
            if self.stall == Some(container_id.as_ref()) {
                std::future::pending::<()>().await;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.stats
                .get(container_id.as_ref())
                .cloned()
                .ok_or_else(|| runtime::Error::Status {
                    status: hyper::StatusCode::NOT_FOUND,
                    message: format!("No such container: {container_id}"),
                })
        }
    }

    fn fixture() -> StatsSnapshot {
        serde_json::from_value(serde_json::json!({
            "cpu_stats": {
                "cpu_usage": {"total_usage": 1_200_000_000u64},
                "system_cpu_usage": 22_000_000_000u64,
                "online_cpus": 4
            },
            "precpu_stats": {
                "cpu_usage": {"total_usage": 1_000_000_000u64},
                "system_cpu_usage": 20_000_000_000u64,
                "online_cpus": 4
            },
            "memory_stats": {"usage": 104_857_600u64, "stats": {"cache": 10_485_760u64}}
        }))
        .unwrap()
    }

    fn two_containers_one_failing() -> FakeRuntime {
        FakeRuntime {
            containers: vec!["aaa111", "abc123"],
            stats: HashMap::from([("abc123", fixture())]),
            ..Default::default()
        }
    }

    /// Gathers `collector` through a registry and returns the samples of the text exposition.
    fn render(collector: DockerCollector<FakeRuntime>) -> (Registry, Vec<(String, f64)>) {
        let registry = Registry::new();
        registry.register(Box::new(collector)).unwrap();
        let lines = samples(&registry);
        (registry, lines)
    }

    fn samples(registry: &Registry) -> Vec<(String, f64)> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .unwrap();
        String::from_utf8(buffer)
            .unwrap()
            .lines()
            .filter(|line| !line.starts_with('#') && !line.is_empty())
            .map(|line| {
                let (series, value) = line.rsplit_once(' ').unwrap();
                (series.to_owned(), value.parse().unwrap())
            })
            .collect()
    }

    #[tokio::test]
    async fn test_scrape_derives_metrics() {
        let runtime = FakeRuntime {
            containers: vec!["abc123"],
            stats: HashMap::from([("abc123", fixture())]),
            ..Default::default()
        };
        let collector =
            DockerCollector::new(runtime, tokio::runtime::Handle::current(), None).unwrap();

        let metrics = collector.scrape().await;

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].container_id().as_ref(), "abc123");
        assert!((metrics[0].cpu_percent() - 40.0).abs() < 1e-9);
        assert_eq!(metrics[0].memory_bytes(), 94_371_840);
    }

    #[tokio::test]
    async fn test_scrape_skips_failing_container() {
        let collector = DockerCollector::new(
            two_containers_one_failing(),
            tokio::runtime::Handle::current(),
            None,
        )
        .unwrap();

        let ids: Vec<_> = collector
            .scrape()
            .await
            .iter()
            .map(|m| m.container_id().to_string())
            .collect();
        assert_eq!(ids, ["abc123"]);
    }

    #[tokio::test]
    async fn test_scrape_skips_invalid_container_id() {
        let runtime = FakeRuntime {
            containers: vec!["../../info", "abc123"],
            stats: HashMap::from([("abc123", fixture())]),
            ..Default::default()
        };
        let collector =
            DockerCollector::new(runtime, tokio::runtime::Handle::current(), None).unwrap();

        assert_eq!(collector.scrape().await.len(), 1);
    }

    #[tokio::test]
    async fn test_scrape_deadline_returns_partial_results() {
        let runtime = FakeRuntime {
            containers: vec!["abc123", "stuck", "def456"],
            stats: HashMap::from([("abc123", fixture()), ("def456", fixture())]),
            stall: Some("stuck"),
            ..Default::default()
        };
        let collector = DockerCollector::new(
            runtime,
            tokio::runtime::Handle::current(),
            Some(Duration::from_millis(50)),
        )
        .unwrap();

        let metrics = collector.scrape().await;

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].container_id().as_ref(), "abc123");
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_config_publishes_every_slow_container() {
        // The engine needs about a second per one-shot stats call.
        let ids = [
            "c00", "c01", "c02", "c03", "c04", "c05", "c06", "c07", "c08", "c09", "c10", "c11",
        ];
        let runtime = FakeRuntime {
            containers: ids.to_vec(),
            stats: ids.iter().map(|id| (*id, fixture())).collect(),
            delay: Some(Duration::from_millis(1_100)),
            ..Default::default()
        };
        let timeout = crate::config::Config::from_lookup(|_| None)
            .unwrap()
            .scrape_timeout;
        let collector =
            DockerCollector::new(runtime, tokio::runtime::Handle::current(), timeout).unwrap();

        let metrics = collector.scrape().await;

        let scraped: Vec<&str> = metrics.iter().map(|m| m.container_id().as_ref()).collect();
        assert_eq!(scraped, ids);
    }

    #[test]
    fn test_collect_publishes_two_samples_per_container() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let collector =
            DockerCollector::new(two_containers_one_failing(), rt.handle().clone(), None).unwrap();

        let (_, samples) = render(collector);

        let series: Vec<_> = samples.iter().map(|(series, _)| series.as_str()).collect();
        assert_eq!(
            series,
            [
                "docker_exporter_cpu_usage_percent{container_id=\"abc123\"}",
                "docker_exporter_memory_usage_bytes{container_id=\"abc123\"}",
            ]
        );
        assert!((samples[0].1 - 40.0).abs() < 1e-9);
        assert_eq!(samples[1].1, 94_371_840.0);
    }

    #[test]
    fn test_collect_is_empty_when_listing_fails() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let runtime = FakeRuntime {
            list_fails: true,
            containers: vec!["abc123"],
            stats: HashMap::from([("abc123", fixture())]),
            ..Default::default()
        };
        let collector = DockerCollector::new(runtime, rt.handle().clone(), None).unwrap();

        let (_, samples) = render(collector);

        assert!(samples.is_empty());
    }

    #[test]
    fn test_consecutive_scrapes_are_identical() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let collector =
            DockerCollector::new(two_containers_one_failing(), rt.handle().clone(), None).unwrap();

        let (registry, first) = render(collector);
        let second = samples(&registry);

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_describe_returns_both_descriptors() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let collector =
            DockerCollector::new(FakeRuntime::default(), rt.handle().clone(), None).unwrap();

        let names: Vec<_> = collector.desc().iter().map(|d| d.fq_name.as_str()).collect();
        assert_eq!(
            names,
            [
                "docker_exporter_cpu_usage_percent",
                "docker_exporter_memory_usage_bytes"
            ]
        );
    }
}
