//! Generation request and response types

use serde::{Deserialize, Serialize};

/// Default completion budget when the caller does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature; support answers favour determinism
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// A single text-generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// User prompt
    pub prompt: String,
    /// Optional system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Maximum completion tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Model override; ignored by providers whose catalogue lacks it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl GenerationRequest {
    /// Create a request with default budget and temperature
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            model: None,
        }
    }

    /// Set the system prompt (builder pattern)
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Set the token budget (builder pattern)
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature (builder pattern)
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Request a specific model (builder pattern)
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Token accounting for one response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// False when the counts were reported by the backend, true when approximated
    pub estimated: bool,
}

impl TokenUsage {
    /// Usage reported by the backend
    pub fn reported(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            estimated: false,
        }
    }

    /// Usage approximated locally
    pub fn estimated(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            estimated: true,
            ..Self::reported(prompt_tokens, completion_tokens)
        }
    }
}

/// A complete generation result
///
/// Successful responses are always complete; there is no partial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,
    /// Provider that produced the text
    pub provider: String,
    /// Model that produced the text
    pub model_used: String,
    /// Wall time of the successful attempt in milliseconds
    pub duration_ms: u64,
    /// Token accounting
    pub usage: TokenUsage,
    /// 1-based position of the successful attempt in the router's order
    pub attempt_count: u32,
    /// True when `attempt_count > 1`
    pub is_fallback: bool,
    /// Description of the failure immediately preceding this attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_error: Option<String>,
}

impl GenerationResponse {
    /// Untagged response as produced by a backend adapter
    pub fn new(text: impl Into<String>, model_used: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            provider: String::new(),
            model_used: model_used.into(),
            duration_ms: 0,
            usage,
            attempt_count: 0,
            is_fallback: false,
            previous_error: None,
        }
    }

    /// Tag the response with its position in the attempt sequence
    pub fn tagged(mut self, attempt_count: u32, previous_error: Option<String>) -> Self {
        self.attempt_count = attempt_count;
        self.is_fallback = attempt_count > 1;
        self.previous_error = if self.is_fallback {
            previous_error
        } else {
            None
        };
        self
    }

    /// Total tokens consumed
    pub fn tokens_used(&self) -> u64 {
        self.usage.total_tokens
    }
}
