//! Background polling configuration.

use serde::{Deserialize, Serialize};

/// Background refresh cadence for list views.
///
/// Background polls are silent: their failures are logged at debug level
/// and never surfaced to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Interval between silent manager-list refreshes, in seconds.
    #[serde(default = "default_managers_interval")]
    pub managers_interval_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            managers_interval_seconds: default_managers_interval(),
        }
    }
}

fn default_managers_interval() -> u64 {
    30
}
