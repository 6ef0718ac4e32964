//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the file holding the persisted bearer token.
    #[serde(default = "default_token_file")]
    pub token_file: String,
    /// Interval at which the stored token is re-checked for passive
    /// expiry, in seconds.
    #[serde(default = "default_revalidate_interval")]
    pub revalidate_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
            revalidate_interval_seconds: default_revalidate_interval(),
        }
    }
}

fn default_token_file() -> String {
    "data/session.token".to_string()
}

fn default_revalidate_interval() -> u64 {
    60
}
