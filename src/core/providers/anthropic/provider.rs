//! Anthropic Provider Implementation

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

use super::DEFAULT_API_VERSION;
use super::client::{self, MESSAGES_PATH, MessagesRequest, MessagesResponse};
use super::streaming::AnthropicStreamTransformer;
use crate::core::providers::base::{
    BaseConfig, ProviderRuntime, approximate_prompt_tokens, send_checked, send_json,
    sse_text_stream,
};
use crate::core::providers::traits::{GenerationProvider, TextStream};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::router::stats::ProviderStats;
use crate::core::types::{GenerationRequest, GenerationResponse};

/// Anthropic Messages API backend
#[derive(Debug)]
pub struct AnthropicProvider {
    runtime: ProviderRuntime,
    endpoint: String,
    http: Client,
}

impl AnthropicProvider {
    pub fn new(runtime: ProviderRuntime, config: &BaseConfig, http: Client) -> Self {
        Self {
            endpoint: config.endpoint(MESSAGES_PATH),
            runtime,
            http,
        }
    }

    pub fn runtime(&self) -> &ProviderRuntime {
        &self.runtime
    }

    fn post(&self, api_key: &str, body: &MessagesRequest<'_>) -> RequestBuilder {
        self.http
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", DEFAULT_API_VERSION)
            .json(body)
    }
}

#[async_trait]
impl GenerationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        self.runtime.name()
    }

    fn has_credentials(&self) -> bool {
        self.runtime.has_credentials()
    }

    fn stats(&self) -> &ProviderStats {
        self.runtime.stats()
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let api_key = self.runtime.api_key()?;
        let (model, max_tokens) = self.runtime.resolve_model(request)?;
        let body = client::build_request(request, &model, max_tokens, false);

        let name = self.name();
        let (body, model) = (&body, &model);

        self.runtime
            .execute(move || async move {
                let raw: MessagesResponse = send_json(name, self.post(api_key, body)).await?;
                client::parse_response(name, raw, request, model)
            })
            .await
    }

    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<TextStream, ProviderError> {
        let api_key = self.runtime.api_key()?;
        let (model, max_tokens) = self.runtime.resolve_model(request)?;
        let body = client::build_request(request, &model, max_tokens, true);
        let prompt_tokens =
            approximate_prompt_tokens(&request.prompt, request.system_prompt.as_deref());

        let name = self.name();
        let body = &body;

        self.runtime
            .open_stream(prompt_tokens, move || async move {
                let response = send_checked(name, self.post(api_key, body)).await?;
                Ok(sse_text_stream(
                    response.bytes_stream(),
                    AnthropicStreamTransformer::new(name),
                ))
            })
            .await
    }
}
