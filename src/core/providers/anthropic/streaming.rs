//! Anthropic Streaming Module
//!
//! Typed SSE events: only `content_block_delta` carries text, `message_stop`
//! ends the stream and `error` aborts it.

use serde::Deserialize;

use crate::core::providers::base::sse::{SSEEvent, SSETransformer};
use crate::core::providers::unified_provider::ProviderError;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    Error { error: StreamError },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(rename = "type", default)]
    error_type: String,
    #[serde(default)]
    message: String,
}

/// Transformer for Anthropic Messages streaming events
#[derive(Debug, Clone)]
pub struct AnthropicStreamTransformer {
    provider_name: String,
}

impl AnthropicStreamTransformer {
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
        }
    }

    fn map_stream_error(&self, error: StreamError) -> ProviderError {
        let provider = &self.provider_name;
        match error.error_type.as_str() {
            "overloaded_error" | "api_error" => {
                ProviderError::provider_unavailable(provider, error.message)
            }
            "rate_limit_error" => ProviderError::rate_limit(provider, None),
            "authentication_error" | "permission_error" => {
                ProviderError::authentication(provider, error.message)
            }
            "invalid_request_error" => ProviderError::invalid_request(provider, error.message),
            "not_found_error" => ProviderError::api_error(provider, 404, error.message),
            _ => ProviderError::api_error(provider, 500, error.message),
        }
    }
}

impl SSETransformer for AnthropicStreamTransformer {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn is_end_marker(&self, event: &SSEEvent) -> bool {
        event.event_type.as_deref() == Some("message_stop")
    }

    fn transform_event(&self, event: &SSEEvent) -> Result<Option<String>, ProviderError> {
        let parsed: StreamEvent = serde_json::from_str(&event.data).map_err(|e| {
            ProviderError::response_parsing(
                &self.provider_name,
                format!("Failed to parse stream event: {}", e),
            )
        })?;

        match parsed {
            StreamEvent::ContentBlockDelta { delta } => Ok(delta.text),
            StreamEvent::Error { error } => Err(self.map_stream_error(error)),
            StreamEvent::Other => Ok(None),
        }
    }
}
