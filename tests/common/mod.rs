//! Common test utilities for support-router
//!
//! - Configuration fixtures pointing providers at mock servers
//! - Canned backend payloads and SSE bodies
//! - Skip macros for live tests

pub mod fixtures;
pub mod providers;

pub use fixtures::{config_for, fast_retry, mock_provider, router_for};

/// Skip test if API key is not available for a provider kind
#[macro_export]
macro_rules! skip_without_api_key {
    ($kind:expr) => {
        if !$crate::common::providers::has_api_key($kind) {
            eprintln!("Skipping test: no API key set for {} provider", $kind);
            return;
        }
    };
}
