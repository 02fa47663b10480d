//! Google Generative Language `generateContent` wire format

use serde::{Deserialize, Serialize};

use crate::core::providers::base::usage_or_estimate;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{GenerationRequest, GenerationResponse};

/// Path for a complete generation
pub fn generate_path(model: &str) -> String {
    format!("models/{}:generateContent", model)
}

/// Path for an SSE generation
pub fn stream_path(model: &str) -> String {
    format!("models/{}:streamGenerateContent?alt=sse", model)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content<'a>>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Part<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

/// Finish reasons that mean the output was withheld
const BLOCKED_FINISH_REASONS: &[&str] =
    &["SAFETY", "RECITATION", "BLOCKLIST", "PROHIBITED_CONTENT"];

/// Build the request body
pub fn build_request(request: &GenerationRequest, max_tokens: u32) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        system_instruction: request.system_prompt.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
        generation_config: GenerationConfig {
            max_output_tokens: max_tokens,
            temperature: request.temperature,
        },
    }
}

impl GenerateContentResponse {
    /// Text of the first candidate, or the reason there is none
    pub fn text(&self, provider: &str) -> Result<Option<String>, ProviderError> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(ProviderError::content_filtered(provider, reason));
        }

        let Some(candidate) = self.candidates.first() else {
            return Ok(None);
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKED_FINISH_REASONS.contains(&reason) {
                return Err(ProviderError::content_filtered(provider, reason));
            }
        }

        Ok(candidate.content.as_ref().map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect()
        }))
    }
}

/// Turn a decoded response into a generation result
pub fn parse_response(
    provider: &str,
    response: GenerateContentResponse,
    request: &GenerationRequest,
    model: &str,
) -> Result<GenerationResponse, ProviderError> {
    let text = response
        .text(provider)?
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ProviderError::response_parsing(provider, "response has no candidates"))?;

    let usage = usage_or_estimate(
        response
            .usage_metadata
            .map(|u| (u.prompt_token_count, u.candidates_token_count)),
        request,
        &text,
    );

    Ok(GenerationResponse::new(
        text,
        response.model_version.unwrap_or_else(|| model.to_string()),
        usage,
    ))
}
