//! Gemini Streaming Module
//!
//! With `alt=sse` every event carries a complete `GenerateContentResponse`.

use super::client::GenerateContentResponse;
use crate::core::providers::base::sse::{SSEEvent, SSETransformer};
use crate::core::providers::unified_provider::ProviderError;

/// Transformer for Gemini `streamGenerateContent` events
#[derive(Debug, Clone)]
pub struct GeminiStreamTransformer {
    provider_name: String,
}

impl GeminiStreamTransformer {
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
        }
    }
}

impl SSETransformer for GeminiStreamTransformer {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn transform_event(&self, event: &SSEEvent) -> Result<Option<String>, ProviderError> {
        let value: serde_json::Value = serde_json::from_str(&event.data).map_err(|e| {
            ProviderError::response_parsing(
                &self.provider_name,
                format!("Failed to parse stream event: {}", e),
            )
        })?;

        if let Some(error) = value.get("error") {
            let status = error.get("code").and_then(|c| c.as_u64()).unwrap_or(500) as u16;
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("stream error");
            return Err(ProviderError::from_status(
                &self.provider_name,
                status,
                message,
                None,
            ));
        }

        let chunk: GenerateContentResponse = serde_json::from_value(value)
            .map_err(|e| ProviderError::from(e).with_provider(&self.provider_name))?;
        chunk.text(&self.provider_name)
    }
}
