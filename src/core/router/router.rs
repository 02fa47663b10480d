//! Router core structure
//!
//! Owns the registered providers, the selector and the static priority
//! order. Constructed once and shared across callers behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::RouterError;
use super::health::{HealthReport, ProviderStatusReport};
use super::selection::ProviderSelector;
use crate::config::Config;
use crate::core::providers::base::ConnectionPool;
use crate::core::providers::traits::GenerationProvider;
use crate::core::providers::{ProviderRegistry, build_provider};
use crate::utils::error::Result;

/// Default capacity of a streaming response channel
pub const DEFAULT_STREAM_BUFFER: usize = 64;

/// Multi-provider generation router
#[derive(Debug)]
pub struct Router {
    /// Providers in registration order
    pub(crate) registry: ProviderRegistry,

    /// Weight policies and selection rules
    pub(crate) selector: ProviderSelector,

    /// Static order used when no provider qualifies as best
    pub(crate) priority: Vec<String>,

    /// Capacity of each streaming channel
    pub(crate) stream_buffer: usize,

    /// Parent of every live stream's token
    pub(crate) shutdown: CancellationToken,
}

impl Router {
    /// Create a router over already-built providers
    ///
    /// The priority order starts as registration order.
    pub fn new(registry: ProviderRegistry, selector: ProviderSelector) -> Self {
        let priority = registry.names().map(String::from).collect();
        Self {
            registry,
            selector,
            priority,
            stream_buffer: DEFAULT_STREAM_BUFFER,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build every configured provider and the selector
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let pool = ConnectionPool::new()?;
        let retry = config.router.retry.to_policy();

        let mut registry = ProviderRegistry::new();
        let mut selector = ProviderSelector::default();
        for provider_config in &config.providers {
            registry.register(build_provider(provider_config, &retry, &pool))?;
            selector.set_policy(provider_config.weight_policy());
        }

        let router = Self::new(registry, selector)
            .with_priority(config.router.priority.clone())
            .with_stream_buffer(config.router.stream_buffer);

        info!(
            providers = router.registry.len(),
            credentialed = router
                .providers()
                .iter()
                .filter(|p| p.has_credentials())
                .count(),
            priority = ?router.priority,
            "router initialized"
        );
        Ok(router)
    }

    /// Override the static priority order (builder pattern)
    ///
    /// Listed providers come first in the given order, the rest keep
    /// registration order. Unknown names are ignored.
    pub fn with_priority(mut self, priority: Vec<String>) -> Self {
        let mut order: Vec<String> = Vec::with_capacity(self.registry.len());
        for name in priority
            .into_iter()
            .chain(self.registry.names().map(String::from))
        {
            if self.registry.contains(&name) && !order.contains(&name) {
                order.push(name);
            }
        }
        self.priority = order;
        self
    }

    /// Set the streaming channel capacity (builder pattern)
    pub fn with_stream_buffer(mut self, capacity: usize) -> Self {
        self.stream_buffer = capacity.max(1);
        self
    }

    pub fn providers(&self) -> &[Arc<dyn GenerationProvider>] {
        self.registry.providers()
    }

    pub fn provider(&self, name: &str) -> Option<&Arc<dyn GenerationProvider>> {
        self.registry.get(name)
    }

    pub fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    /// Order in which one request tries providers
    ///
    /// The best provider followed by the fallback order, or the static
    /// priority order restricted to credentialed providers when nothing
    /// qualifies as best.
    pub(crate) fn attempt_order(&self) -> Vec<Arc<dyn GenerationProvider>> {
        let providers = self.registry.providers();

        match self.selector.select_best_provider(providers) {
            Some(best) => std::iter::once(best)
                .chain(
                    self.selector
                        .get_fallback_order(providers, Some(best.name())),
                )
                .cloned()
                .collect(),
            None => self
                .priority
                .iter()
                .filter_map(|name| self.registry.get(name))
                .filter(|p| p.has_credentials())
                .cloned()
                .collect(),
        }
    }

    /// Statistics of every provider keyed by name
    pub fn get_provider_stats(&self) -> BTreeMap<String, ProviderStatusReport> {
        self.registry
            .providers()
            .iter()
            .map(|p| (p.name().to_string(), ProviderStatusReport::of(p.as_ref())))
            .collect()
    }

    /// Router-wide health summary
    pub fn health_check(&self) -> HealthReport {
        HealthReport::from_providers(self.registry.providers())
    }

    /// Stop accepting requests and cancel every live stream
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("router shutting down");
            self.shutdown.cancel();
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub(crate) fn ensure_running(&self) -> std::result::Result<(), RouterError> {
        if self.is_shutting_down() {
            return Err(RouterError::ShuttingDown);
        }
        Ok(())
    }
}
