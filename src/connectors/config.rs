use serde::{Deserialize, Serialize};

/// CMS connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Talk to a real CMS. When false the seeded in-memory connector is used.
    #[serde(default = "CmsConfig::default_enabled")]
    pub enabled: bool,
    /// Base URL of the CMS (e.g., http://localhost:1337)
    #[serde(default = "CmsConfig::default_base_url")]
    pub base_url: String,
    /// HTTP request timeout in seconds
    #[serde(default = "CmsConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of attempts for read requests failing at the transport level
    #[serde(default = "CmsConfig::default_retry_attempts")]
    pub retry_attempts: usize,
    /// Read-only API token used when no user session is active
    /// (from env: LEFTORIUM_CMS_TOKEN)
    #[serde(skip)]
    pub api_token: Option<String>,
}

impl CmsConfig {
    const fn default_enabled() -> bool {
        true
    }

    fn default_base_url() -> String {
        "http://localhost:1337".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        10
    }

    const fn default_retry_attempts() -> usize {
        3
    }
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
            retry_attempts: Self::default_retry_attempts(),
            api_token: None,
        }
    }
}
