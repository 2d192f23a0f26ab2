//! Scheduler configuration.

use std::time::Duration;

use serde::Deserialize;

/// Pass cadence and per-pass parallelism.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between pass starts.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Targets processed concurrently within a pass.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Run the first pass immediately instead of after one interval.
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,
}

const fn default_interval_secs() -> u64 {
    3600 // hourly
}

const fn default_concurrency() -> usize {
    5
}

const fn default_run_on_start() -> bool {
    true
}

impl SchedulerConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            concurrency: default_concurrency(),
            run_on_start: default_run_on_start(),
        }
    }
}
