//! Scan worker pool configuration.

use serde::{Deserialize, Serialize};

/// Default number of entities evaluated concurrently per kind.
const fn default_max_concurrency() -> usize {
    8
}

/// Default interval for `fwatch watch`, in seconds.
const fn default_interval_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Upper bound on concurrent per-entity evaluations within one kind.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Delay between periodic scans in watch mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            interval_secs: default_interval_secs(),
        }
    }
}
