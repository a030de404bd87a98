//! GitHub client configuration.

use serde::{Deserialize, Serialize};

/// GitHub search client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token (optional; unauthenticated search has a far lower quota)
    pub token: Option<String>,
    /// Search requests allowed per cooldown window
    #[serde(default = "default_quota")]
    pub quota: u32,
    /// Cooldown between quota windows and between retries, in seconds
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Attempts per count call before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_quota() -> u32 {
    30
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            quota: default_quota(),
            cooldown_secs: default_cooldown_secs(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
