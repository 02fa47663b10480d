//! Unified Provider Error Handling
//!
//! Single error type for all generation backends.
//!
//! | Variant | Purpose | Class |
//! |------|------|--------|
//! | Configuration | Missing credential or bad setup | Configuration |
//! | Authentication | Credential rejected | Permanent |
//! | RateLimit | Rate limit exceeded | Transient |
//! | Timeout | Per-call timeout elapsed | Transient |
//! | Network | Transport failure | Transient |
//! | ProviderUnavailable | Backend overloaded / down | Transient |
//! | ApiError | HTTP error with status | by status |
//! | InvalidRequest | Request rejected | Permanent |
//! | ContentFiltered | Policy rejection | Permanent |
//! | ModelNotFound | Unknown model | Permanent |
//! | ResponseParsing | Malformed backend response | Permanent |
//! | Cancelled | Caller cancelled | Permanent |
//!
//! Classification is done by variant, never by inspecting messages.

use serde::Serialize;

/// How a provider error should be treated by the retry and fallover layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The provider cannot be used at all (no credential). Never counted as a failure.
    Configuration,
    /// Worth retrying in place after a delay.
    Transient,
    /// Surfaces immediately; only fallover to another provider can help.
    Permanent,
}

/// Unified provider error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Configuration error for {provider}: {message}")]
    Configuration { provider: String, message: String },

    #[error("Authentication failed for {provider}: {message}")]
    Authentication { provider: String, message: String },

    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: String,
        message: String,
        /// Seconds the backend asked us to wait, when it said so
        retry_after: Option<u64>,
    },

    #[error("Timeout for {provider}: {message}")]
    Timeout { provider: String, message: String },

    #[error("Network error for {provider}: {message}")]
    Network { provider: String, message: String },

    #[error("Provider {provider} is unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid request for {provider}: {message}")]
    InvalidRequest { provider: String, message: String },

    #[error("Content filtered by {provider} safety systems: {reason}")]
    ContentFiltered { provider: String, reason: String },

    #[error("Model '{model}' not found for {provider}")]
    ModelNotFound { provider: String, model: String },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing { provider: String, message: String },

    #[error("Operation cancelled for {provider}")]
    Cancelled { provider: String },
}

impl ProviderError {
    /// Create configuration error
    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create authentication error
    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create rate limit error
    pub fn rate_limit(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: match retry_after {
                Some(seconds) => format!("Rate limit exceeded. Retry after {} seconds", seconds),
                None => "Rate limit exceeded".to_string(),
            },
            retry_after,
        }
    }

    /// Create timeout error
    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create network error
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create provider unavailable error
    pub fn provider_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create API error with status code
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create invalid request error
    pub fn invalid_request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create content filtered error
    pub fn content_filtered(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create model not found error
    pub fn model_not_found(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Create response parsing error
    pub fn response_parsing(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create cancellation error
    pub fn cancelled(provider: impl Into<String>) -> Self {
        Self::Cancelled {
            provider: provider.into(),
        }
    }

    /// Map an HTTP error status returned by a backend to the matching variant
    pub fn from_status(provider: &str, status: u16, body: &str, retry_after: Option<u64>) -> Self {
        match status {
            400 | 422 => Self::invalid_request(provider, body),
            401 | 403 => Self::authentication(provider, body),
            404 => Self::api_error(provider, status, body),
            408 => Self::timeout(provider, format!("Backend timed out: {}", body)),
            429 => Self::rate_limit(provider, retry_after),
            502..=504 => Self::provider_unavailable(provider, body),
            _ => Self::api_error(provider, status, body),
        }
    }

    /// Get the provider name that caused this error
    pub fn provider(&self) -> &str {
        match self {
            Self::Configuration { provider, .. }
            | Self::Authentication { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::Network { provider, .. }
            | Self::ProviderUnavailable { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::InvalidRequest { provider, .. }
            | Self::ContentFiltered { provider, .. }
            | Self::ModelNotFound { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::Cancelled { provider } => provider,
        }
    }

    /// Short, stable name of the variant for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Authentication { .. } => "authentication",
            Self::RateLimit { .. } => "rate_limit",
            Self::Timeout { .. } => "timeout",
            Self::Network { .. } => "network",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::ApiError { .. } => "api_error",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::ContentFiltered { .. } => "content_filtered",
            Self::ModelNotFound { .. } => "model_not_found",
            Self::ResponseParsing { .. } => "response_parsing",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// Classify this error for retry and fallover decisions
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Configuration { .. } => ErrorClass::Configuration,

            Self::RateLimit { .. }
            | Self::Timeout { .. }
            | Self::Network { .. }
            | Self::ProviderUnavailable { .. } => ErrorClass::Transient,

            // API errors depend on status code
            Self::ApiError { status, .. } => match *status {
                408 | 429 | 500..=599 => ErrorClass::Transient,
                _ => ErrorClass::Permanent,
            },

            Self::Authentication { .. }
            | Self::InvalidRequest { .. }
            | Self::ContentFiltered { .. }
            | Self::ModelNotFound { .. }
            | Self::ResponseParsing { .. }
            | Self::Cancelled { .. } => ErrorClass::Permanent,
        }
    }

    /// Check if this error is retryable in place
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Delay the backend explicitly asked for, in seconds
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Re-attribute an error produced by a shared helper to a concrete provider
    pub fn with_provider(mut self, name: &str) -> Self {
        match &mut self {
            Self::Configuration { provider, .. }
            | Self::Authentication { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::Network { provider, .. }
            | Self::ProviderUnavailable { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::InvalidRequest { provider, .. }
            | Self::ContentFiltered { provider, .. }
            | Self::ModelNotFound { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::Cancelled { provider } => *provider = name.to_string(),
        }
        self
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // Provider name is filled in by `with_provider` at the call site
        let provider = "unknown";

        if err.is_timeout() {
            Self::timeout(provider, err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(provider, status.as_u16(), &err.to_string(), None)
        } else {
            Self::network(provider, err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::response_parsing("unknown", err.to_string())
    }
}
