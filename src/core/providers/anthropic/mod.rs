//! Anthropic Provider Implementation
//!
//! Messages API with typed streaming events.

pub mod client;
pub mod provider;
pub mod streaming;

pub use provider::AnthropicProvider;
pub use streaming::AnthropicStreamTransformer;

/// API version header sent with every request
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
