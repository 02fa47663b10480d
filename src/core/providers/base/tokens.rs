//! Token approximation
//!
//! None of the supported backends ship a local tokenizer we can bundle, so
//! counts are approximated from whitespace-separated words when the backend
//! does not report usage.

/// Average tokens per English word for BPE-style tokenizers, in tenths
const TENTHS_OF_TOKEN_PER_WORD: u64 = 13;

use crate::core::types::{GenerationRequest, TokenUsage};

/// Approximate the token count of `text`
pub fn approximate_tokens(text: &str) -> u64 {
    let words = text.split_whitespace().count() as u64;
    (words * TENTHS_OF_TOKEN_PER_WORD).div_ceil(10)
}

/// Approximate prompt tokens for a request, including the system prompt
pub fn approximate_prompt_tokens(prompt: &str, system_prompt: Option<&str>) -> u64 {
    approximate_tokens(prompt) + system_prompt.map(approximate_tokens).unwrap_or(0)
}

/// Backend-reported usage when present, otherwise an approximation
pub fn usage_or_estimate(
    reported: Option<(u64, u64)>,
    request: &GenerationRequest,
    completion: &str,
) -> TokenUsage {
    match reported {
        Some((prompt, completion)) => TokenUsage::reported(prompt, completion),
        None => TokenUsage::estimated(
            approximate_prompt_tokens(&request.prompt, request.system_prompt.as_deref()),
            approximate_tokens(completion),
        ),
    }
}
