//! Execution implementation for Router
//!
//! Strictly sequential failover across providers. In-place retry of
//! transient errors happens inside each provider.

use std::time::Instant;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::error::RouterError;
use super::router::Router;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{GenerationRequest, GenerationResponse};

impl Router {
    /// Generate a complete response, failing over until one provider succeeds
    ///
    /// Providers without credentials or reporting unhealthy are skipped and
    /// do not count as attempts.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, RouterError> {
        self.ensure_running()?;

        let span = info_span!("generate", request_id = %Uuid::new_v4());
        self.generate_in_order(request).instrument(span).await
    }

    async fn generate_in_order(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, RouterError> {
        let order = self.attempt_order();
        let mut attempts = 0u32;
        let mut last_error: Option<ProviderError> = None;

        for provider in &order {
            if !provider.has_credentials() {
                debug!(provider = provider.name(), "skipping provider without credentials");
                continue;
            }
            if !provider.is_healthy() {
                debug!(provider = provider.name(), "skipping unhealthy provider");
                continue;
            }

            attempts += 1;
            let start = Instant::now();

            match provider.generate(request).await {
                Ok(response) => {
                    info!(
                        provider = provider.name(),
                        attempt = attempts,
                        latency_ms = start.elapsed().as_millis() as u64,
                        tokens = response.tokens_used(),
                        "generation succeeded"
                    );
                    let previous = last_error.as_ref().map(ToString::to_string);
                    return Ok(response.tagged(attempts, previous));
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        attempt = attempts,
                        latency_ms = start.elapsed().as_millis() as u64,
                        error_kind = err.kind(),
                        error_class = ?err.class(),
                        "generation attempt failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        warn!(attempts, "all providers exhausted");
        Err(RouterError::Exhausted {
            attempts,
            last_error,
        })
    }

    /// Convenience wrapper building the request from its parts
    pub async fn generate_text(
        &self,
        prompt: impl Into<String>,
        system_prompt: Option<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<GenerationResponse, RouterError> {
        let mut request = GenerationRequest::new(prompt)
            .with_max_tokens(max_tokens)
            .with_temperature(temperature);
        request.system_prompt = system_prompt;
        self.generate(&request).await
    }
}
