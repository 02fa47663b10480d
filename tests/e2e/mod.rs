//! End-to-end tests for support-router
//!
//! These tests call the real backends and require API keys.
//! Run with: cargo test -- --ignored
//!
//! Required environment variables (any subset):
//! - OPENAI_API_KEY: For OpenAI tests
//! - ANTHROPIC_API_KEY: For Anthropic tests
//! - GEMINI_API_KEY or GOOGLE_API_KEY: For Gemini tests

pub mod generation;
