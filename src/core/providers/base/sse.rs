//! Unified SSE (Server-Sent Events) Parser
//!
//! Every streaming backend speaks SSE; providers only implement the
//! per-event transformation into text fragments.

use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::super::traits::TextStream;
use crate::core::providers::unified_provider::ProviderError;

/// Parsed SSE Event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SSEEvent {
    pub event_type: Option<String>,
    pub data: String,
}

/// Trait for provider-specific SSE transformation
pub trait SSETransformer: Send + Sync + 'static {
    /// Provider name for error reporting
    fn provider_name(&self) -> &str;

    /// Check if this is the end-of-stream marker
    fn is_end_marker(&self, event: &SSEEvent) -> bool {
        event.data.trim() == "[DONE]"
    }

    /// Extract the text fragment carried by one event, if any
    fn transform_event(&self, event: &SSEEvent) -> Result<Option<String>, ProviderError>;
}

/// Incremental SSE decoder
///
/// Bytes may split lines (and UTF-8 sequences) arbitrarily; incomplete
/// trailing data is buffered until the next push.
#[derive(Debug, Default)]
pub struct SSEDecoder {
    buffer: Vec<u8>,
    current: Option<SSEEvent>,
}

impl SSEDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SSEEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing event not terminated by a blank line
    pub fn finish(&mut self) -> Option<SSEEvent> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).into_owned();
            if let Some(event) = self.process_line(line.trim_end_matches('\r')) {
                return Some(event);
            }
        }
        self.current.take().filter(|e| !e.data.is_empty())
    }

    fn process_line(&mut self, line: &str) -> Option<SSEEvent> {
        // Empty line signals end of event
        if line.is_empty() {
            return self.current.take().filter(|e| !e.data.is_empty());
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.find(':') {
            Some(colon) => (&line[..colon], line[colon + 1..].trim_start()),
            None => (line, ""),
        };

        let current = self.current.get_or_insert_with(SSEEvent::default);
        match field {
            "data" => {
                if !current.data.is_empty() {
                    current.data.push('\n');
                }
                current.data.push_str(value);
            }
            "event" => current.event_type = Some(value.to_string()),
            // id / retry carry nothing we route on
            _ => {}
        }
        None
    }
}

/// Turn a raw SSE byte stream into a stream of text fragments
pub fn sse_text_stream<S, T>(bytes: S, transformer: T) -> TextStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    T: SSETransformer,
{
    let stream = stream! {
        let mut decoder = SSEDecoder::new();
        let mut bytes = Box::pin(bytes);

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(ProviderError::from(e).with_provider(transformer.provider_name()));
                    return;
                }
            };

            for event in decoder.push(&chunk) {
                if transformer.is_end_marker(&event) {
                    return;
                }
                match transformer.transform_event(&event) {
                    Ok(Some(text)) if !text.is_empty() => yield Ok(text),
                    Ok(_) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        if let Some(event) = decoder.finish() {
            if !transformer.is_end_marker(&event) {
                match transformer.transform_event(&event) {
                    Ok(Some(text)) if !text.is_empty() => yield Ok(text),
                    Ok(_) => {}
                    Err(e) => yield Err(e),
                }
            }
        }
    };

    stream.boxed()
}
