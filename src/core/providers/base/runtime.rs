//! Shared provider runtime
//!
//! Everything a backend adapter needs besides its wire format: credential,
//! per-call timeout, model catalogue, owned statistics and the bounded
//! in-place retry loop.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_stream::stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::tokens::approximate_tokens;
use crate::core::providers::traits::TextStream;
use crate::core::providers::unified_provider::{ErrorClass, ProviderError};
use crate::core::router::stats::ProviderStats;
use crate::core::types::{GenerationRequest, GenerationResponse};

/// Catalogue entry for one model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Largest completion the model accepts
    pub max_tokens: u32,
    /// Lower value is preferred as the default model
    #[serde(default = "default_model_priority")]
    pub priority: u32,
}

fn default_model_priority() -> u32 {
    1
}

/// Models a provider may serve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCatalogue(BTreeMap<String, ModelSpec>);

impl ModelCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model (builder pattern)
    pub fn with_model(mut self, name: impl Into<String>, max_tokens: u32, priority: u32) -> Self {
        self.0.insert(
            name.into(),
            ModelSpec {
                max_tokens,
                priority,
            },
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, model: &str) -> Option<&ModelSpec> {
        self.0.get(model)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Preferred model: lowest priority value, ties by name
    pub fn default_model(&self) -> Option<(&str, &ModelSpec)> {
        self.0
            .iter()
            .min_by_key(|(name, spec)| (spec.priority, name.as_str()))
            .map(|(name, spec)| (name.as_str(), spec))
    }

    /// Pick the model for a request and cap its token budget
    ///
    /// A requested model outside the catalogue falls back to the default.
    pub fn resolve(&self, request: &GenerationRequest) -> Option<(String, u32)> {
        let (name, spec) = request
            .model
            .as_deref()
            .and_then(|m| self.0.get_key_value(m).map(|(n, s)| (n.as_str(), s)))
            .or_else(|| self.default_model())?;
        Some((name.to_string(), request.max_tokens.min(spec.max_tokens)))
    }
}

/// In-place retry policy for transient errors
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total tries including the first
    pub max_attempts: u32,
    /// Delay before the second try
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay after failed try number `attempt` (1-based)
    ///
    /// Honours a backend-supplied `retry_after`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        if let Some(seconds) = error.retry_after() {
            return Duration::from_secs(seconds).min(self.max_delay);
        }

        let factor = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        self.base_delay.mul_f64(factor).min(self.max_delay)
    }
}

/// Per-provider machinery shared by every adapter
#[derive(Debug)]
pub struct ProviderRuntime {
    name: String,
    api_key: Option<String>,
    timeout: Duration,
    models: ModelCatalogue,
    retry: RetryPolicy,
    stats: Arc<ProviderStats>,
}

impl ProviderRuntime {
    pub fn new(name: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let name = name.into();
        Self {
            stats: Arc::new(ProviderStats::new(name.clone())),
            name,
            // An empty key counts as absent
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
            models: ModelCatalogue::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the model catalogue (builder pattern)
    pub fn with_models(mut self, models: ModelCatalogue) -> Self {
        self.models = models;
        self
    }

    /// Set the retry policy (builder pattern)
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn models(&self) -> &ModelCatalogue {
        &self.models
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn stats(&self) -> &ProviderStats {
        &self.stats
    }

    /// The credential, or a configuration error that is never counted
    pub fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProviderError::configuration(&self.name, "no API key configured"))
    }

    /// Model and capped token budget for a request
    pub fn resolve_model(
        &self,
        request: &GenerationRequest,
    ) -> Result<(String, u32), ProviderError> {
        self.models.resolve(request).ok_or_else(|| {
            ProviderError::configuration(&self.name, "model catalogue is empty")
        })
    }

    /// One try of `operation` bounded by the per-call timeout
    async fn try_once<T, Fut>(&self, operation: Fut) -> Result<T, ProviderError>
    where
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        match timeout(self.timeout, operation).await {
            Ok(result) => result.map_err(|e| e.with_provider(&self.name)),
            Err(_) => Err(ProviderError::timeout(
                &self.name,
                format!("no response within {}ms", self.timeout.as_millis()),
            )),
        }
    }

    /// Run `operation` with bounded retry of transient errors
    ///
    /// Returns the value together with the latency of the successful try.
    /// Configuration errors pass through untouched; every other terminal
    /// error is counted once, after local retries are exhausted.
    async fn run_with_retry<T, F, Fut>(
        &self,
        operation: F,
    ) -> Result<(T, Duration), ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        self.api_key()?;

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let start = Instant::now();
            match self.try_once(operation()).await {
                Ok(value) => return Ok((value, start.elapsed())),
                Err(err) => match err.class() {
                    ErrorClass::Configuration => return Err(err),
                    ErrorClass::Transient if attempt < max_attempts => {
                        let delay = self.retry.delay_for(attempt, &err);
                        warn!(
                            provider = %self.name,
                            attempt,
                            error_kind = err.kind(),
                            delay_ms = delay.as_millis() as u64,
                            "transient provider error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    _ => {
                        warn!(
                            provider = %self.name,
                            attempt,
                            error_kind = err.kind(),
                            "provider call failed"
                        );
                        self.stats.record_failure();
                        return Err(err);
                    }
                },
            }
        }
    }

    /// Execute a complete generation with retry and stats bookkeeping
    pub async fn execute<F, Fut>(&self, operation: F) -> Result<GenerationResponse, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<GenerationResponse, ProviderError>>,
    {
        let (mut response, latency) = self.run_with_retry(operation).await?;

        response.provider = self.name.clone();
        response.duration_ms = latency.as_millis() as u64;
        self.stats.record_success(latency.as_secs_f64() * 1000.0);
        self.stats.record_tokens(response.usage.total_tokens);

        debug!(
            provider = %self.name,
            model = %response.model_used,
            latency_ms = response.duration_ms,
            tokens = response.usage.total_tokens,
            "provider call succeeded"
        );
        Ok(response)
    }

    /// Open a stream with retry, then record the outcome when it ends
    ///
    /// Retry only covers establishing the stream. Each fragment must arrive
    /// within the per-call timeout. A stream dropped by its consumer before
    /// finishing records nothing.
    pub async fn open_stream<F, Fut>(
        &self,
        prompt_tokens: u64,
        operation: F,
    ) -> Result<TextStream, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<TextStream, ProviderError>>,
    {
        let started = Instant::now();
        let (mut inner, _) = self.run_with_retry(operation).await?;

        let stats = Arc::clone(&self.stats);
        let name = self.name.clone();
        let idle_timeout = self.timeout;

        let recorded = stream! {
            let mut completion_tokens = 0u64;
            loop {
                match timeout(idle_timeout, inner.next()).await {
                    Ok(Some(Ok(fragment))) => {
                        completion_tokens += approximate_tokens(&fragment);
                        yield Ok(fragment);
                    }
                    Ok(Some(Err(err))) => {
                        warn!(provider = %name, error_kind = err.kind(), "stream failed");
                        stats.record_failure();
                        yield Err(err.with_provider(&name));
                        return;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        warn!(provider = %name, "stream stalled");
                        stats.record_failure();
                        yield Err(ProviderError::timeout(
                            &name,
                            format!("no stream data within {}ms", idle_timeout.as_millis()),
                        ));
                        return;
                    }
                }
            }

            stats.record_success(started.elapsed().as_secs_f64() * 1000.0);
            stats.record_tokens(prompt_tokens + completion_tokens);
            debug!(provider = %name, completion_tokens, "stream completed");
        };

        Ok(recorded.boxed())
    }
}
