//! Anthropic Messages API wire format

use serde::{Deserialize, Serialize};

use crate::core::providers::base::usage_or_estimate;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{GenerationRequest, GenerationResponse};

pub const MESSAGES_PATH: &str = "messages";

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Build the request body
pub fn build_request<'a>(
    request: &'a GenerationRequest,
    model: &'a str,
    max_tokens: u32,
    stream: bool,
) -> MessagesRequest<'a> {
    MessagesRequest {
        model,
        max_tokens,
        temperature: request.temperature,
        system: request.system_prompt.as_deref(),
        messages: vec![Message {
            role: "user",
            content: &request.prompt,
        }],
        stream,
    }
}

/// Turn a decoded response into a generation result
pub fn parse_response(
    provider: &str,
    response: MessagesResponse,
    request: &GenerationRequest,
    model: &str,
) -> Result<GenerationResponse, ProviderError> {
    if response.stop_reason.as_deref() == Some("refusal") {
        return Err(ProviderError::content_filtered(provider, "model refused the request"));
    }

    let text: String = response
        .content
        .iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text.as_deref())
        .collect();

    if text.is_empty() {
        return Err(ProviderError::response_parsing(
            provider,
            "response has no text content",
        ));
    }

    let usage = usage_or_estimate(
        response.usage.map(|u| (u.input_tokens, u.output_tokens)),
        request,
        &text,
    );

    Ok(GenerationResponse::new(
        text,
        response.model.unwrap_or_else(|| model.to_string()),
        usage,
    ))
}
