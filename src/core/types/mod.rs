//! Shared request/response types

pub mod generation;

pub use generation::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationRequest, GenerationResponse, TokenUsage,
};
