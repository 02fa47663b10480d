//! Error types for the router service

use crate::core::providers::unified_provider::ProviderError;
use crate::core::router::RouterError;
use thiserror::Error;

/// Result type alias for the router service
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Main error type for the router service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Provider errors raised outside a routed call
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Routed call failures
    #[error("Router error: {0}")]
    Router(#[from] RouterError),
}

impl ServiceError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
