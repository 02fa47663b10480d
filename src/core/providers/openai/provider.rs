//! OpenAI Provider Implementation

use async_trait::async_trait;
use reqwest::Client;

use super::client::{self, CHAT_COMPLETIONS_PATH, ChatCompletionResponse};
use super::streaming::OpenAIStreamTransformer;
use crate::core::providers::base::{
    BaseConfig, ProviderRuntime, approximate_prompt_tokens, send_checked, send_json,
    sse_text_stream,
};
use crate::core::providers::traits::{GenerationProvider, TextStream};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::router::stats::ProviderStats;
use crate::core::types::{GenerationRequest, GenerationResponse};

/// OpenAI (or OpenAI-compatible) chat completions backend
#[derive(Debug)]
pub struct OpenAIProvider {
    runtime: ProviderRuntime,
    endpoint: String,
    http: Client,
}

impl OpenAIProvider {
    pub fn new(runtime: ProviderRuntime, config: &BaseConfig, http: Client) -> Self {
        Self {
            endpoint: config.endpoint(CHAT_COMPLETIONS_PATH),
            runtime,
            http,
        }
    }

    pub fn runtime(&self) -> &ProviderRuntime {
        &self.runtime
    }
}

#[async_trait]
impl GenerationProvider for OpenAIProvider {
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
        let (http, endpoint, body, model) = (&self.http, &self.endpoint, &body, &model);

        self.runtime
            .execute(move || async move {
                let raw: ChatCompletionResponse =
                    send_json(name, http.post(endpoint).bearer_auth(api_key).json(body)).await?;
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
        let (http, endpoint, body) = (&self.http, &self.endpoint, &body);

        self.runtime
            .open_stream(prompt_tokens, move || async move {
                let response =
                    send_checked(name, http.post(endpoint).bearer_auth(api_key).json(body)).await?;
                Ok(sse_text_stream(
                    response.bytes_stream(),
                    OpenAIStreamTransformer::new(name),
                ))
            })
            .await
    }
}
