//! The capability interface every generation backend implements

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::base::tokens::approximate_tokens;
use super::unified_provider::ProviderError;
use crate::core::router::stats::ProviderStats;
use crate::core::types::{GenerationRequest, GenerationResponse};

/// Lazy sequence of text fragments produced by one backend
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

/// Consecutive failures at which a provider reports itself unhealthy
pub const HEALTH_MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Requests needed before the success rate affects health
pub const HEALTH_MIN_REQUESTS: u64 = 10;

/// Success rate below which a provider with enough history is unhealthy
pub const HEALTH_MIN_SUCCESS_RATE: f64 = 0.5;

/// Backend-intrinsic circuit breaker
///
/// Deliberately stricter than, and independent of, the weight policy's
/// exclusion rule and the fallback order's cutoff.
pub fn is_healthy_from_stats(stats: &ProviderStats) -> bool {
    if stats.consecutive_failures() >= HEALTH_MAX_CONSECUTIVE_FAILURES {
        return false;
    }
    !(stats.total_requests() >= HEALTH_MIN_REQUESTS
        && stats.success_rate() < HEALTH_MIN_SUCCESS_RATE)
}

/// One remote text-generation backend
///
/// Implementations own their statistics and perform bounded in-place retry
/// of transient errors; the router only ever fails over between providers.
#[async_trait]
pub trait GenerationProvider: Send + Sync + std::fmt::Debug {
    /// Unique provider name
    fn name(&self) -> &str;

    /// Whether a credential is configured
    fn has_credentials(&self) -> bool;

    /// Live statistics owned by this provider
    fn stats(&self) -> &ProviderStats;

    /// Health gate applied by the router before every attempt
    fn is_healthy(&self) -> bool {
        is_healthy_from_stats(self.stats())
    }

    /// Count tokens in `text`; approximate unless the backend has a tokenizer
    fn count_tokens(&self, text: &str) -> u64 {
        approximate_tokens(text)
    }

    /// Generate a complete response
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError>;

    /// Open a streaming response
    ///
    /// Errors before the first fragment are returned here; later errors
    /// arrive as stream items and end the stream.
    async fn generate_stream(&self, request: &GenerationRequest)
    -> Result<TextStream, ProviderError>;
}
