//! Payloads of the Docker Engine API consumed by the exporter.
//!
//! Only the fields the exporter reads are modelled; unknown fields are ignored
//! and missing counters decode as zero, which is what the engine reports for
//! the `precpu_stats` of a container that has not been sampled before.

use std::collections::HashMap;

/// One entry of `GET /containers/json`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "Id")]
    pub id: String,
}

/// A point-in-time statistics snapshot from `GET /containers/{id}/stats?stream=false`.
///
/// The engine fills both `cpu_stats` and `precpu_stats`, so a rate can be
/// derived from a single snapshot without keeping state between scrapes.
#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub cpu_stats: CpuStats,
    #[serde(default)]
    pub precpu_stats: CpuStats,
    #[serde(default)]
    pub memory_stats: MemoryStats,
}

/// Cumulative CPU counters of a container and of the whole host.
#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
pub struct CpuStats {
    #[serde(default)]
    pub cpu_usage: CpuUsage,
    /// Host CPU time in nanoseconds.
    #[serde(default)]
    pub system_cpu_usage: u64,
    #[serde(default)]
    pub online_cpus: Option<u32>,
}

impl CpuStats {
    /// Returns the number of logical CPUs the counters refer to.
    ///
    /// Prefers `online_cpus` and falls back to the length of the per-CPU
    /// breakdown, which older engines and cgroup v1 hosts report instead.
    pub fn cpu_count(&self) -> u32 {
        match self.online_cpus {
            Some(n) if n > 0 => n,
            _ => self
                .cpu_usage
                .percpu_usage
                .as_ref()
                .map_or(0, |percpu| percpu.len() as u32),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
pub struct CpuUsage {
    /// Container CPU time in nanoseconds.
    #[serde(default)]
    pub total_usage: u64,
    #[serde(default)]
    pub percpu_usage: Option<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
pub struct MemoryStats {
    /// Raw memory usage in bytes, including page cache.
    #[serde(default)]
    pub usage: u64,
    /// Detailed breakdown, keyed as in the cgroup `memory.stat` file.
    #[serde(default)]
    pub stats: HashMap<String, u64>,
}

impl MemoryStats {
    /// Returns the page-cache figure, or `None` if the engine did not report one.
    pub fn cache(&self) -> Option<u64> {
        self.stats.get("cache").copied()
    }
}
