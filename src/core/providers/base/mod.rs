//! Base components shared by all backend adapters

pub mod config;
pub mod connection_pool;
pub mod runtime;
pub mod sse;
pub mod tokens;

pub use config::BaseConfig;
pub use connection_pool::{ConnectionPool, send_checked, send_json};
pub use runtime::{ModelCatalogue, ModelSpec, ProviderRuntime, RetryPolicy};
pub use sse::{SSEDecoder, SSEEvent, SSETransformer, sse_text_stream};
pub use tokens::{approximate_prompt_tokens, approximate_tokens, usage_or_estimate};
