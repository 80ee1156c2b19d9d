use serde::{Deserialize, Serialize};

/// Configuration for retry and backoff behavior.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Maximum number of attempts including the first one
    pub max_attempts: usize,
    /// Lower bound of the backoff delay in milliseconds
    pub min_wait_ms: u64,
    /// Maximum backoff delay in milliseconds
    pub max_wait_ms: u64,
    /// Whether to randomize each backoff delay
    pub jitter: bool,
}

const DEFAULT_MAX_ATTEMPTS: usize = 3;
const DEFAULT_MIN_WAIT_MS: u64 = 1_000;
const DEFAULT_MAX_WAIT_MS: u64 = 10_000;

impl ResilienceConfig {
    /// Creates a default configuration: 3 attempts, 1-10 s randomized backoff.
    pub fn defaults() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_wait_ms: DEFAULT_MIN_WAIT_MS,
            max_wait_ms: DEFAULT_MAX_WAIT_MS,
            jitter: true,
        }
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
