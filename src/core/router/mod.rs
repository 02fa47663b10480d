//! Core router for generation provider management and failover
//!
//! ## Module Structure
//!
//! - `stats` - Per-provider rolling counters
//! - `weight` - Weight policy: dynamic scoring and exclusion
//! - `selection` - Best provider and fallback order
//! - `router` - Core Router struct, reports and lifecycle
//! - `execute_impl` - Complete generation with failover
//! - `streaming` - Streaming generation with failover
//! - `health` - Serialisable health and statistics reports
//! - `error` - Router error types

pub mod error;
pub mod execute_impl;
pub mod health;
pub mod router;
pub mod selection;
pub mod stats;
pub mod streaming;
pub mod weight;

#[cfg(test)]
mod tests;

pub use error::RouterError;
pub use health::{
    HealthReport, OverallStatus, ProviderHealth, ProviderHealthStatus, ProviderStatusReport,
};
pub use router::{DEFAULT_STREAM_BUFFER, Router};
pub use selection::{FALLBACK_MAX_CONSECUTIVE_FAILURES, FALLBACK_WEIGHT_FLOOR, ProviderSelector};
pub use stats::{ProviderStats, ProviderStatsSnapshot};
pub use streaming::GenerationStream;
pub use weight::ProviderWeightPolicy;
