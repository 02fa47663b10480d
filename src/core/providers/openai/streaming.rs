//! OpenAI Streaming Response Handler
//!
//! Uses the unified SSE parser for consistent streaming across providers.

use serde::Deserialize;

use crate::core::providers::base::sse::{SSEEvent, SSETransformer};
use crate::core::providers::unified_provider::ProviderError;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(default)]
    message: String,
}

/// Transformer for OpenAI-compatible `chat.completion.chunk` events
#[derive(Debug, Clone)]
pub struct OpenAIStreamTransformer {
    provider_name: String,
}

impl OpenAIStreamTransformer {
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
        }
    }
}

impl SSETransformer for OpenAIStreamTransformer {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn transform_event(&self, event: &SSEEvent) -> Result<Option<String>, ProviderError> {
        let chunk: StreamChunk = serde_json::from_str(&event.data).map_err(|e| {
            ProviderError::response_parsing(
                &self.provider_name,
                format!("Failed to parse stream chunk: {}", e),
            )
        })?;

        if let Some(error) = chunk.error {
            return Err(ProviderError::provider_unavailable(
                &self.provider_name,
                error.message,
            ));
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            // Usage-only trailer chunks carry no choices
            return Ok(None);
        };

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(ProviderError::content_filtered(
                &self.provider_name,
                "stream stopped by content filter",
            ));
        }

        Ok(choice.delta.and_then(|d| d.content))
    }
}
