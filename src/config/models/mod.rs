//! Configuration data models

pub mod logging;
pub mod provider;
pub mod router;

pub use logging::*;
pub use provider::*;
pub use router::*;

/// Default maximum tries per provider call
pub fn default_max_attempts() -> u32 {
    3
}

/// Default delay before the first retry
pub fn default_base_delay_ms() -> u64 {
    500
}

/// Default upper bound on a retry delay
pub fn default_max_delay_ms() -> u64 {
    8_000
}

pub fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Default capacity of a streaming channel
pub fn default_stream_buffer() -> usize {
    crate::core::router::DEFAULT_STREAM_BUFFER
}

pub fn default_log_level() -> String {
    "info".to_string()
}
