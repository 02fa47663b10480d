//! Generation backends
//!
//! One capability trait, one shared runtime and one adapter per backend kind.

// Base infrastructure
pub mod base;

// Provider modules
pub mod anthropic;
pub mod gemini;
pub mod openai;

// Registry and unified provider
pub mod provider_registry;
pub mod traits;
pub mod unified_provider;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use base::ModelCatalogue;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
pub use provider_registry::{ProviderRegistry, build_provider};
pub use traits::{GenerationProvider, TextStream};
pub use unified_provider::{ErrorClass, ProviderError};

/// Backend kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(alias = "open_ai")]
    OpenAI,
    Anthropic,
    #[serde(alias = "google")]
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::OpenAI, Self::Anthropic, Self::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    /// Prefix of the environment variables configuring this kind
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI",
            Self::Anthropic => "ANTHROPIC",
            Self::Gemini => "GEMINI",
        }
    }

    /// Environment variables holding the API key, in lookup order
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAI => &["OPENAI_API_KEY"],
            Self::Anthropic => &["ANTHROPIC_API_KEY"],
            Self::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Catalogue used when the configuration lists no models
    pub fn default_models(&self) -> ModelCatalogue {
        match self {
            Self::OpenAI => ModelCatalogue::new()
                .with_model("gpt-4o-mini", 16_384, 1)
                .with_model("gpt-4o", 16_384, 2),
            Self::Anthropic => ModelCatalogue::new()
                .with_model("claude-3-5-haiku-latest", 8_192, 1)
                .with_model("claude-3-5-sonnet-latest", 8_192, 2),
            Self::Gemini => ModelCatalogue::new()
                .with_model("gemini-1.5-flash", 8_192, 1)
                .with_model("gemini-1.5-pro", 8_192, 2),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(Self::OpenAI),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(format!("unknown provider kind '{}'", other)),
        }
    }
}
