//! # support-router
//!
//! Multi-provider LLM generation router for a customer-support assistant
//! backend. Each provider is scored from its live request history, the best
//! one is tried first, and failures fall over to the rest in weight order.
//!
//! ## Features
//!
//! - **Health-aware scoring**: success rate, latency and failure streaks feed each provider's weight
//! - **Sequential failover**: one provider at a time, with transient errors retried in place
//! - **Streaming**: fragments are forwarded through a bounded, cancellable channel
//! - **Backends**: OpenAI, Anthropic and Gemini adapters over a shared HTTP client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use support_router::{Config, Router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/router.example.yaml").await?;
//!     let router = Router::from_config(&config)?;
//!
//!     let response = router
//!         .generate_text("How do I reset my password?", None, 512, 0.2)
//!         .await?;
//!     println!("{} answered: {}", response.provider, response.text);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{Result, ServiceError};

pub use core::providers::{
    ErrorClass, GenerationProvider, ProviderError, ProviderKind, ProviderRegistry, TextStream,
};
pub use core::router::{
    GenerationStream, HealthReport, ProviderSelector, ProviderStats, ProviderWeightPolicy, Router,
    RouterError,
};
pub use core::types::{GenerationRequest, GenerationResponse, TokenUsage};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build information
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp in Unix seconds
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
