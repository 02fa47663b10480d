//! Router error types

use crate::core::providers::unified_provider::ProviderError;

/// Router error types
///
/// Per-provider failures never escape the router on their own; callers see
/// either a success or one of these.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RouterError {
    /// Every viable provider failed or was skipped
    #[error("all providers exhausted after {attempts} attempt(s){}", last_error_suffix(.last_error))]
    Exhausted {
        /// Providers actually invoked
        attempts: u32,
        /// Failure of the last invoked provider
        last_error: Option<ProviderError>,
    },

    /// The router has been shut down
    #[error("router is shutting down")]
    ShuttingDown,

    /// The consumer cancelled the stream
    #[error("stream cancelled")]
    StreamCancelled,
}

fn last_error_suffix(last_error: &Option<ProviderError>) -> String {
    match last_error {
        Some(err) => format!(": {}", err),
        None => ": no provider with credentials is available".to_string(),
    }
}

impl RouterError {
    /// Number of providers invoked before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            _ => 0,
        }
    }

    /// The last provider failure, if any provider was invoked
    pub fn last_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Exhausted { last_error, .. } => last_error.as_ref(),
            _ => None,
        }
    }
}
