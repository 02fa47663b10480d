//! Gemini Provider Implementation

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

use super::client::{self, GenerateContentRequest, GenerateContentResponse};
use super::streaming::GeminiStreamTransformer;
use crate::core::providers::base::{
    BaseConfig, ProviderRuntime, approximate_prompt_tokens, send_checked, send_json,
    sse_text_stream,
};
use crate::core::providers::traits::{GenerationProvider, TextStream};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::router::stats::ProviderStats;
use crate::core::types::{GenerationRequest, GenerationResponse};

/// Google Gemini backend
#[derive(Debug)]
pub struct GeminiProvider {
    runtime: ProviderRuntime,
    config: BaseConfig,
    http: Client,
}

impl GeminiProvider {
    pub fn new(runtime: ProviderRuntime, config: &BaseConfig, http: Client) -> Self {
        Self {
            runtime,
            config: config.clone(),
            http,
        }
    }

    pub fn runtime(&self) -> &ProviderRuntime {
        &self.runtime
    }

    fn post(&self, path: &str, api_key: &str, body: &GenerateContentRequest<'_>) -> RequestBuilder {
        self.http
            .post(self.config.endpoint(path))
            .header("x-goog-api-key", api_key)
            .json(body)
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
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
        let body = client::build_request(request, max_tokens);
        let path = client::generate_path(&model);

        let name = self.name();
        let (body, model, path) = (&body, &model, &path);

        self.runtime
            .execute(move || async move {
                let raw: GenerateContentResponse =
                    send_json(name, self.post(path, api_key, body)).await?;
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
        let body = client::build_request(request, max_tokens);
        let path = client::stream_path(&model);
        let prompt_tokens =
            approximate_prompt_tokens(&request.prompt, request.system_prompt.as_deref());

        let name = self.name();
        let (body, path) = (&body, &path);

        self.runtime
            .open_stream(prompt_tokens, move || async move {
                let response = send_checked(name, self.post(path, api_key, body)).await?;
                Ok(sse_text_stream(
                    response.bytes_stream(),
                    GeminiStreamTransformer::new(name),
                ))
            })
            .await
    }
}
