//! Streaming generation
//!
//! A spawned task walks the attempt order and feeds a bounded channel.
//! Attempts that can still fail over are buffered in full so no partial text
//! from a failing provider ever reaches the consumer. The last viable
//! attempt is forwarded live.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::error::RouterError;
use super::router::Router;
use crate::core::providers::traits::{GenerationProvider, TextStream};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::GenerationRequest;

/// Single-consumer stream of text fragments
///
/// Dropping the stream or calling [`GenerationStream::cancel`] stops the
/// producer and the in-flight backend call.
#[derive(Debug)]
pub struct GenerationStream {
    inner: ReceiverStream<Result<String, RouterError>>,
    token: CancellationToken,
    /// Terminal error left by an interrupted producer, yielded after the queue drains
    interrupted: Arc<Mutex<Option<RouterError>>>,
}

impl GenerationStream {
    /// Stop producing; the stream then yields `StreamCancelled` and ends
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Collect every fragment into one string, failing on the first error
    pub async fn collect_text(mut self) -> Result<String, RouterError> {
        let mut text = String::new();
        while let Some(fragment) = self.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

impl Stream for GenerationStream {
    type Item = Result<String, RouterError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(None) => Poll::Ready(self.interrupted.lock().take().map(Err)),
            other => other,
        }
    }
}

impl Drop for GenerationStream {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Why the producer stopped early
enum Interrupted {
    Cancelled,
    ConsumerGone,
}

impl Router {
    /// Stream a response, failing over between providers
    ///
    /// Fails immediately when no credentialed provider exists or the router
    /// is shutting down. Later failures arrive as the stream's last item.
    pub fn generate_stream(
        self: &Arc<Self>,
        request: GenerationRequest,
    ) -> Result<GenerationStream, RouterError> {
        self.ensure_running()?;

        let order: Vec<Arc<dyn GenerationProvider>> = self
            .attempt_order()
            .into_iter()
            .filter(|p| p.has_credentials())
            .collect();

        if order.is_empty() {
            return Err(RouterError::Exhausted {
                attempts: 0,
                last_error: None,
            });
        }

        let token = self.shutdown.child_token();
        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let interrupted = Arc::new(Mutex::new(None));

        let producer = StreamProducer {
            order,
            request,
            tx,
            token: token.clone(),
            shutdown: self.shutdown.clone(),
            interrupted: Arc::clone(&interrupted),
        };
        let span = info_span!("generate_stream", request_id = %Uuid::new_v4());
        tokio::spawn(producer.run().instrument(span));

        Ok(GenerationStream {
            inner: ReceiverStream::new(rx),
            token,
            interrupted,
        })
    }
}

struct StreamProducer {
    order: Vec<Arc<dyn GenerationProvider>>,
    request: GenerationRequest,
    tx: mpsc::Sender<Result<String, RouterError>>,
    token: CancellationToken,
    shutdown: CancellationToken,
    interrupted: Arc<Mutex<Option<RouterError>>>,
}

impl StreamProducer {
    async fn run(self) {
        match self.drive().await {
            Ok(()) => {}
            Err(Interrupted::Cancelled) => {
                let reason = if self.shutdown.is_cancelled() {
                    RouterError::ShuttingDown
                } else {
                    RouterError::StreamCancelled
                };
                debug!(%reason, "stream producer stopped");
                // Delivered once the consumer has drained what is already queued
                *self.interrupted.lock() = Some(reason);
            }
            Err(Interrupted::ConsumerGone) => debug!("stream consumer went away"),
        }
    }

    async fn drive(&self) -> Result<(), Interrupted> {
        let mut attempts = 0u32;
        let mut last_error: Option<ProviderError> = None;

        for (index, provider) in self.order.iter().enumerate() {
            if !provider.is_healthy() {
                debug!(provider = provider.name(), "skipping unhealthy provider");
                continue;
            }

            // Final when nothing after it could still take over
            let is_final = !self.order[index + 1..].iter().any(|p| p.is_healthy());
            attempts += 1;

            let opened = tokio::select! {
                _ = self.token.cancelled() => return Err(Interrupted::Cancelled),
                opened = provider.generate_stream(&self.request) => opened,
            };

            let stream = match opened {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        attempt = attempts,
                        error_kind = err.kind(),
                        "stream attempt failed to open"
                    );
                    last_error = Some(err);
                    continue;
                }
            };

            let outcome = if is_final {
                self.forward_live(stream).await?
            } else {
                self.forward_buffered(stream).await?
            };

            match outcome {
                None => {
                    info!(provider = provider.name(), attempt = attempts, "stream completed");
                    return Ok(());
                }
                Some(err) => {
                    warn!(
                        provider = provider.name(),
                        attempt = attempts,
                        error_kind = err.kind(),
                        live = is_final,
                        "stream attempt failed"
                    );
                    last_error = Some(err);
                    if is_final {
                        break;
                    }
                }
            }
        }

        self.send(Err(RouterError::Exhausted {
            attempts,
            last_error,
        }))
        .await
    }

    /// Buffer the whole attempt and release it only if it completes
    async fn forward_buffered(
        &self,
        mut stream: TextStream,
    ) -> Result<Option<ProviderError>, Interrupted> {
        let mut buffered = Vec::new();
        loop {
            let next = tokio::select! {
                _ = self.token.cancelled() => return Err(Interrupted::Cancelled),
                next = stream.next() => next,
            };
            match next {
                Some(Ok(fragment)) => buffered.push(fragment),
                Some(Err(err)) => return Ok(Some(err)),
                None => break,
            }
        }

        for fragment in buffered {
            self.send(Ok(fragment)).await?;
        }
        Ok(None)
    }

    /// Forward fragments as they arrive
    async fn forward_live(
        &self,
        mut stream: TextStream,
    ) -> Result<Option<ProviderError>, Interrupted> {
        loop {
            let next = tokio::select! {
                _ = self.token.cancelled() => return Err(Interrupted::Cancelled),
                next = stream.next() => next,
            };
            match next {
                Some(Ok(fragment)) => self.send(Ok(fragment)).await?,
                Some(Err(err)) => return Ok(Some(err)),
                None => return Ok(None),
            }
        }
    }

    async fn send(&self, item: Result<String, RouterError>) -> Result<(), Interrupted> {
        tokio::select! {
            _ = self.token.cancelled() => Err(Interrupted::Cancelled),
            sent = self.tx.send(item) => sent.map_err(|_| Interrupted::ConsumerGone),
        }
    }
}
