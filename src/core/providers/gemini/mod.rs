//! Gemini Provider
//!
//! Google Generative Language API (`generateContent`).

pub mod client;
pub mod provider;
pub mod streaming;

pub use provider::GeminiProvider;
pub use streaming::GeminiStreamTransformer;
