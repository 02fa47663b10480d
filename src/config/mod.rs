//! Configuration management for the router
//!
//! Configuration comes from a YAML file or the environment. In both cases
//! provider fields left unset fall back to the kind's environment variables
//! when the provider is built, and `ROUTER_*` variables override the router
//! and logging sections.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::core::providers::ProviderKind;
use crate::utils::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Comma-separated provider names overriding `router.priority`
pub const PRIORITY_ENV: &str = "ROUTER_PRIORITY";

/// Overrides `logging.level`
pub const LOG_LEVEL_ENV: &str = "ROUTER_LOG_LEVEL";

/// Main configuration struct for the router
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Routing and retry settings
    #[serde(default)]
    pub router: RouterConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Backends in registration order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServiceError::config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    /// Parse YAML, apply `ROUTER_*` overrides and validate
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(content)
            .map_err(|e| ServiceError::config(format!("Failed to parse config: {}", e)))?;

        config.apply_env_overrides();
        config.validate()?;

        debug!(
            providers = config.providers.len(),
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Registers one provider per backend kind, named after the kind. A
    /// `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {:?}", path);
        }

        let mut config = Self {
            providers: ProviderKind::ALL
                .into_iter()
                .map(|kind| ProviderConfig::new(kind.as_str(), kind))
                .collect(),
            ..Default::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(priority) = std::env::var(PRIORITY_ENV) {
            self.router.priority = parse_priority(&priority);
        }
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            if !level.trim().is_empty() {
                self.logging.level = level.trim().to_string();
            }
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(ServiceError::Config)
    }

    /// Names of configured providers in registration order
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name.as_str())
    }

    /// Convert to YAML string; API keys are never written
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn parse_priority(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
