//! OpenAI Provider
//!
//! Chat completions against api.openai.com or any OpenAI-compatible base URL.

pub mod client;
pub mod provider;
pub mod streaming;

pub use provider::OpenAIProvider;
pub use streaming::OpenAIStreamTransformer;
