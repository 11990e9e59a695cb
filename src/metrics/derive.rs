use crate::runtime::StatsSnapshot;

/// CPU and memory figures derived from one [`StatsSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    /// CPU usage in percent of one CPU, i.e. up to `100 * cpu_count`.
    pub cpu_percent: f64,
    /// Memory usage in bytes, excluding page cache.
    pub memory_bytes: u64,
}

impl DerivedMetrics {
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        Self {
            cpu_percent: cpu_percent(snapshot),
            memory_bytes: memory_bytes(snapshot),
        }
    }
}

/// Computes the container's CPU usage between the two samples carried by `snapshot`.
///
/// `(cpu_delta / system_delta) * cpu_count * 100`, where both deltas are taken
/// between `precpu_stats` and `cpu_stats`.
///
/// Returns `0.0` when the host counter did not advance, which happens for the
/// first sample of a freshly started container. A counter that went backwards
/// yields a zero delta.
pub fn cpu_percent(snapshot: &StatsSnapshot) -> f64 {
    let current = &snapshot.cpu_stats;
    let previous = &snapshot.precpu_stats;

    let cpu_delta = current
        .cpu_usage
        .total_usage
        .saturating_sub(previous.cpu_usage.total_usage);
    let system_delta = current
        .system_cpu_usage
        .saturating_sub(previous.system_cpu_usage);
    if system_delta == 0 {
        return 0.0;
    }

    (cpu_delta as f64 / system_delta as f64) * f64::from(current.cpu_count()) * 100.0
}

/// Computes the container's memory usage without reclaimable page cache.
///
/// A missing `cache` entry counts as zero, and a cache larger than the usage
/// clamps the result to zero.
pub fn memory_bytes(snapshot: &StatsSnapshot) -> u64 {
    let memory = &snapshot.memory_stats;
    memory.usage.saturating_sub(memory.cache().unwrap_or(0))
}
