//! Test fixtures and canned backend payloads
//!
//! Every fixture sets the API key, base URL and timeout explicitly so the
//! developer's environment never leaks into a test.

use std::sync::Arc;

use serde_json::{Value, json};
use support_router::config::{ProviderConfig, RetryConfig};
use support_router::{Config, ProviderKind, Router};
use wiremock::MockServer;

/// API key every mock provider is configured with
pub const TEST_KEY: &str = "test-key";

/// Provider pointed at `server` with a fixed key and short timeout
pub fn mock_provider(name: &str, kind: ProviderKind, server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        api_key: Some(TEST_KEY.to_string()),
        base_url: Some(server.uri()),
        timeout_secs: Some(5),
        ..ProviderConfig::new(name, kind)
    }
}

/// Retry policy with millisecond delays
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_delay_ms: 1,
        max_delay_ms: 10,
        backoff_multiplier: 2.0,
    }
}

pub fn config_for(providers: Vec<ProviderConfig>) -> Config {
    let mut config = Config {
        providers,
        ..Default::default()
    };
    config.router.retry = fast_retry();
    config
}

pub fn router_for(providers: Vec<ProviderConfig>) -> Arc<Router> {
    Arc::new(Router::from_config(&config_for(providers)).expect("valid test config"))
}

pub fn openai_reply(text: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19 }
    })
}

pub fn anthropic_reply(text: &str) -> Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-haiku-20241022",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 20, "output_tokens": 9 }
    })
}

pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 8, "candidatesTokenCount": 4, "totalTokenCount": 12 },
        "modelVersion": "gemini-1.5-flash-002"
    })
}

/// SSE body with one `data:` line per payload
pub fn sse_body<'a>(payloads: impl IntoIterator<Item = &'a str>) -> String {
    payloads
        .into_iter()
        .map(|payload| format!("data: {}\n\n", payload))
        .collect()
}

/// OpenAI chunk carrying one text delta
pub fn openai_chunk(text: &str) -> String {
    json!({ "choices": [{ "index": 0, "delta": { "content": text }, "finish_reason": null }] })
        .to_string()
}
