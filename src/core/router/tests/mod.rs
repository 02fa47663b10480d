//! Router tests module
//!
//! Scripted in-process providers driven through the real provider runtime,
//! so local retry and stats bookkeeping behave exactly as in production.


use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;

use crate::core::providers::base::{ModelCatalogue, ProviderRuntime, RetryPolicy};
use crate::core::providers::traits::{GenerationProvider, TextStream};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::providers::ProviderRegistry;
use crate::core::router::selection::ProviderSelector;
use crate::core::router::stats::ProviderStats;
use crate::core::router::weight::ProviderWeightPolicy;
use crate::core::router::Router;
use crate::core::types::{GenerationRequest, GenerationResponse, TokenUsage};

/// What one backend call does
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Reply(&'static str),
    Fail(ProviderError),
    Stream(Vec<Result<&'static str, ProviderError>>),
    /// Emit the fragments, then never finish
    Hang(Vec<&'static str>),
}

/// Sets a flag when the backend stream is dropped
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub(crate) struct ScriptedProvider {
    runtime: ProviderRuntime,
    script: Mutex<VecDeque<Step>>,
    calls: AtomicU32,
    stream_dropped: Arc<AtomicBool>,
}

impl ScriptedProvider {
    pub(crate) fn new(name: &str, steps: Vec<Step>) -> Self {
        Self::build(name, Some("test-key"), steps)
    }

    pub(crate) fn without_credentials(name: &str) -> Self {
        Self::build(name, None, Vec::new())
    }

    fn build(name: &str, api_key: Option<&str>, steps: Vec<Step>) -> Self {
        let runtime = ProviderRuntime::new(
            name,
            api_key.map(String::from),
            Duration::from_secs(2),
        )
        .with_models(ModelCatalogue::new().with_model("scripted-model", 4096, 1))
        .with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        });

        Self {
            runtime,
            script: Mutex::new(steps.into()),
            calls: AtomicU32::new(0),
            stream_dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Backend calls made, including local retries
    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn stream_dropped(&self) -> bool {
        self.stream_dropped.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or(Step::Reply("default reply"))
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
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
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let this = self;
        self.runtime
            .execute(move || async move {
                match this.next_step() {
                    Step::Reply(text) => Ok(GenerationResponse::new(
                        text,
                        "scripted-model",
                        TokenUsage::reported(3, 2),
                    )),
                    Step::Fail(err) => Err(err),
                    step => panic!("unexpected step for generate: {:?}", step),
                }
            })
            .await
    }

    async fn generate_stream(
        &self,
        _request: &GenerationRequest,
    ) -> Result<TextStream, ProviderError> {
        let this = self;
        self.runtime
            .open_stream(0, move || async move {
                match this.next_step() {
                    Step::Reply(text) => Ok(futures::stream::iter([Ok(text.to_string())]).boxed()),
                    Step::Fail(err) => Err(err),
                    Step::Stream(items) => Ok(futures::stream::iter(
                        items
                            .into_iter()
                            .map(|item| item.map(str::to_string))
                            .collect::<Vec<_>>(),
                    )
                    .boxed()),
                    Step::Hang(fragments) => {
                        let flag = DropFlag(Arc::clone(&this.stream_dropped));
                        Ok(stream! {
                            let _flag = flag;
                            for fragment in fragments {
                                yield Ok(fragment.to_string());
                            }
                            futures::future::pending::<()>().await;
                        }
                        .boxed())
                    }
                }
            })
            .await
    }
}

pub(crate) fn transient(provider: &str) -> ProviderError {
    ProviderError::network(provider, "connection reset")
}

pub(crate) fn permanent(provider: &str) -> ProviderError {
    ProviderError::invalid_request(provider, "prompt rejected")
}

/// Router over scripted providers, each with a neutral policy of the given base weight
pub(crate) fn router_from(providers: Vec<(Arc<ScriptedProvider>, f64)>) -> Router {
    let mut registry = ProviderRegistry::new();
    let mut selector = ProviderSelector::default();
    for (provider, base_weight) in providers {
        selector
            .set_policy(ProviderWeightPolicy::new(provider.name()).with_base_weight(base_weight));
        registry
            .register(provider)
            .expect("unique provider names");
    }
    Router::new(registry, selector)
}

pub(crate) fn router_with(providers: Vec<(Arc<ScriptedProvider>, f64)>) -> Arc<Router> {
    Arc::new(router_from(providers))
}

pub(crate) fn record_history(stats: &ProviderStats, successes: u64, failures: u64) {
    for _ in 0..failures {
        stats.record_failure();
    }
    for _ in 0..successes {
        stats.record_success(100.0);
    }
}
