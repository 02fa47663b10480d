//! Provider Registry
//!
//! Name-keyed, insertion-ordered set of providers plus the factory that
//! builds an adapter from its configuration.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::base::{ConnectionPool, ProviderRuntime, RetryPolicy};
use super::traits::GenerationProvider;
use super::unified_provider::ProviderError;
use super::{AnthropicProvider, GeminiProvider, OpenAIProvider, ProviderKind};
use crate::config::ProviderConfig;

/// Registered providers in configuration order
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn GenerationProvider>>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Create new provider registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider; names must be unique
    pub fn register(&mut self, provider: Arc<dyn GenerationProvider>) -> Result<(), ProviderError> {
        let name = provider.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ProviderError::configuration(
                name,
                "a provider with this name is already registered",
            ));
        }
        self.index.insert(name, self.providers.len());
        self.providers.push(provider);
        Ok(())
    }

    /// Get provider by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn GenerationProvider>> {
        self.index.get(name).map(|&i| &self.providers[i])
    }

    /// Check if provider is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Providers in insertion order
    pub fn providers(&self) -> &[Arc<dyn GenerationProvider>] {
        &self.providers
    }

    /// Provider names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name())
    }

    /// Get provider count
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Build the adapter described by `config`
///
/// Providers without a credential are still built; they report
/// `has_credentials() == false` and the router skips them.
pub fn build_provider(
    config: &ProviderConfig,
    retry: &RetryPolicy,
    pool: &ConnectionPool,
) -> Arc<dyn GenerationProvider> {
    let connection = config.connection();
    let runtime = ProviderRuntime::new(
        config.name.clone(),
        connection.api_key.clone(),
        connection.timeout,
    )
    .with_models(config.catalogue())
    .with_retry(retry.clone());

    debug!(
        provider = %config.name,
        kind = %config.kind,
        base_url = %connection.base_url,
        has_credentials = runtime.has_credentials(),
        "building provider"
    );

    let http = pool.client().clone();
    match config.kind {
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(runtime, &connection, http)),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(runtime, &connection, http)),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(runtime, &connection, http)),
    }
}
