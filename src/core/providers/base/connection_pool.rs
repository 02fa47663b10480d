use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::core::providers::unified_provider::ProviderError;

/// Unified connection pool configuration
pub struct PoolConfig;
impl PoolConfig {
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const POOL_SIZE: usize = 16;
    pub const KEEPALIVE_SECS: u64 = 90;
}

/// HTTP client shared by the adapters of one router
///
/// Per-call timeouts are applied by the provider runtime, so the client
/// itself only bounds connection setup.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    client: Client,
}

impl ConnectionPool {
    /// Create a new connection pool with optimized settings
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(PoolConfig::CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(PoolConfig::KEEPALIVE_SECS))
            .pool_max_idle_per_host(PoolConfig::POOL_SIZE)
            .user_agent(concat!("support-router/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::configuration("http", format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Send a request and decode a JSON body, mapping HTTP errors
pub async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = send_checked(provider, request).await?;
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::from(e).with_provider(provider))?;

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::response_parsing(provider, format!("Failed to parse JSON: {}", e))
    })
}

/// Send a request and return the response once its status is a success
pub async fn send_checked(
    provider: &str,
    request: RequestBuilder,
) -> Result<Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from(e).with_provider(provider))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = retry_after_header(&response);
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());

    Err(ProviderError::from_status(
        provider,
        status.as_u16(),
        &error_message(&body),
        retry_after.or_else(|| retry_after_body(&body)),
    ))
}

/// `Retry-After` in delta-seconds form
fn retry_after_header(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Some backends put the delay in the error body instead
fn retry_after_body(body: &str) -> Option<u64> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("retry_after")
        .or_else(|| json.get("error").and_then(|e| e.get("retry_after")))
        .and_then(|v| v.as_u64())
}

/// Best human-readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .or_else(|| json.get("message"))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}
