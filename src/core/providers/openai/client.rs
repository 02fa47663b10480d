//! OpenAI chat completions wire format
//!
//! Also spoken by any OpenAI-compatible endpoint reachable through a custom
//! base URL.

use serde::{Deserialize, Serialize};

use crate::core::providers::base::usage_or_estimate;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{GenerationRequest, GenerationResponse};

pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Build the request body
pub fn build_request<'a>(
    request: &'a GenerationRequest,
    model: &'a str,
    max_tokens: u32,
    stream: bool,
) -> ChatCompletionRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system_prompt.as_deref() {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });

    ChatCompletionRequest {
        model,
        messages,
        max_tokens,
        temperature: request.temperature,
        stream,
    }
}

/// Turn a decoded response into a generation result
pub fn parse_response(
    provider: &str,
    response: ChatCompletionResponse,
    request: &GenerationRequest,
    model: &str,
) -> Result<GenerationResponse, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::response_parsing(provider, "response has no choices"))?;

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(ProviderError::content_filtered(
            provider,
            "completion withheld by content filter",
        ));
    }

    let text = choice
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| ProviderError::response_parsing(provider, "choice has no content"))?;

    let usage = usage_or_estimate(
        response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens)),
        request,
        &text,
    );

    Ok(GenerationResponse::new(
        text,
        response.model.unwrap_or_else(|| model.to_string()),
        usage,
    ))
}
