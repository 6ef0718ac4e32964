//! Retry configuration for the manager-list loader.
//!
//! The manager listing is the only foreground load that auto-retries;
//! every other foreground action surfaces its first failure.

use serde::{Deserialize, Serialize};

/// Bounded exponential-backoff retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds. Doubles on each
    /// subsequent attempt.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    250
}
