//! Connection settings shared by every backend adapter

use std::time::Duration;

use crate::core::providers::ProviderKind;

/// Per-call timeout used when neither config nor environment sets one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved connection settings for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct BaseConfig {
    /// API key; `None` when no credential is configured
    pub api_key: Option<String>,
    /// API base URL without trailing slash
    pub base_url: String,
    /// Per-call timeout
    pub timeout: Duration,
}

impl BaseConfig {
    /// Settings taken from `<KIND>_API_KEY`, `<KIND>_BASE_URL` and `<KIND>_TIMEOUT`
    pub fn from_env(kind: ProviderKind) -> Self {
        let prefix = kind.env_prefix();

        let api_key = kind
            .api_key_env_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|k| !k.trim().is_empty());

        Self {
            api_key,
            base_url: std::env::var(format!("{}_BASE_URL", prefix))
                .unwrap_or_else(|_| kind.default_base_url().to_string()),
            timeout: Duration::from_secs(
                std::env::var(format!("{}_TIMEOUT", prefix))
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }

    /// Explicit values win over the environment, which wins over defaults
    pub fn for_provider(
        kind: ProviderKind,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        let env = Self::from_env(kind);

        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()).or(env.api_key),
            base_url: base_url
                .unwrap_or(env.base_url)
                .trim_end_matches('/')
                .to_string(),
            timeout: timeout_secs.map(Duration::from_secs).unwrap_or(env.timeout),
        }
    }

    /// Full URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
