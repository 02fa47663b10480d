//! Per-provider runtime statistics
//!
//! Counters are plain atomics, mostly `Relaxed`, like the deployment
//! state they replace: routing tolerates slightly stale reads. The one
//! field guarded by exact semantics is `consecutive_failures`, which is only
//! ever changed by a single `fetch_add` or `store(0)`, so threshold checks
//! cannot be skipped by lost updates. `successful_requests` is bumped with
//! `Release` after `total_requests` and read with `Acquire` before it, so a
//! reader never sees more successes than attempts.
//!
//! Statistics live as long as the owning provider and are never persisted.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{
    AtomicU32, AtomicU64,
    Ordering::{Acquire, Relaxed, Release},
};

/// Rolling counters for one provider
#[derive(Debug)]
pub struct ProviderStats {
    provider_name: String,

    /// Total completed attempts (lifetime)
    total_requests: AtomicU64,

    /// Successful attempts (lifetime)
    successful_requests: AtomicU64,

    /// Failed attempts (lifetime)
    failed_requests: AtomicU64,

    /// Failures since the last success
    consecutive_failures: AtomicU32,

    /// Tokens consumed by successful attempts
    total_tokens_used: AtomicU64,

    /// Mean latency of successful attempts, stored as `f64` bits
    average_latency_bits: AtomicU64,

    /// When the last failure was recorded
    last_error_at: Mutex<Option<DateTime<Utc>>>,
}

/// Point-in-time copy of a provider's statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStatsSnapshot {
    pub provider_name: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
    pub average_latency_ms: f64,
    pub consecutive_failures: u32,
    pub total_tokens_used: u64,
    pub last_error_timestamp: Option<DateTime<Utc>>,
}

impl ProviderStatsSnapshot {
    /// Zero-history snapshot for a provider
    pub fn empty(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            success_rate: 1.0,
            average_latency_ms: 0.0,
            consecutive_failures: 0,
            total_tokens_used: 0,
            last_error_timestamp: None,
        }
    }
}

impl ProviderStats {
    /// Create empty statistics for a provider
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            consecutive_failures: AtomicU32::new(0),
            total_tokens_used: AtomicU64::new(0),
            average_latency_bits: AtomicU64::new(0f64.to_bits()),
            last_error_at: Mutex::new(None),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Record a successful attempt
    ///
    /// Resets the consecutive failure streak and folds `latency_ms` into the
    /// running mean of successful attempts.
    pub fn record_success(&self, latency_ms: f64) {
        self.total_requests.fetch_add(1, Relaxed);
        let successes = self.successful_requests.fetch_add(1, Release) + 1;
        self.consecutive_failures.store(0, Relaxed);

        let latency_ms = latency_ms.max(0.0);
        // Incremental mean: avg += (x - avg) / n
        let _ = self
            .average_latency_bits
            .fetch_update(Relaxed, Relaxed, |bits| {
                let avg = f64::from_bits(bits);
                Some((avg + (latency_ms - avg) / successes as f64).to_bits())
            });
    }

    /// Record a failed attempt
    ///
    /// Failures carry no latency: the running mean covers successful
    /// attempts only.
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Relaxed);
        self.failed_requests.fetch_add(1, Relaxed);
        self.consecutive_failures.fetch_add(1, Relaxed);
        *self.last_error_at.lock() = Some(Utc::now());
    }

    /// Add tokens consumed by a successful attempt
    pub fn record_tokens(&self, tokens: u64) {
        self.total_tokens_used.fetch_add(tokens, Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Relaxed)
    }

    pub fn successful_requests(&self) -> u64 {
        self.successful_requests.load(Acquire)
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Relaxed)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Relaxed)
    }

    pub fn total_tokens_used(&self) -> u64 {
        self.total_tokens_used.load(Relaxed)
    }

    pub fn average_latency_ms(&self) -> f64 {
        f64::from_bits(self.average_latency_bits.load(Relaxed))
    }

    pub fn last_error_timestamp(&self) -> Option<DateTime<Utc>> {
        *self.last_error_at.lock()
    }

    /// Fraction of successful attempts
    ///
    /// A provider with no history reports 1.0: fresh backends are scored
    /// optimistically until proven otherwise.
    pub fn success_rate(&self) -> f64 {
        let successful = self.successful_requests();
        let total = self.total_requests();
        rate(successful, total)
    }

    /// Copy every counter into a plain value
    pub fn snapshot(&self) -> ProviderStatsSnapshot {
        let successful_requests = self.successful_requests();
        let total_requests = self.total_requests();
        let success_rate = rate(successful_requests, total_requests);

        ProviderStatsSnapshot {
            provider_name: self.provider_name.clone(),
            total_requests,
            successful_requests,
            failed_requests: self.failed_requests(),
            success_rate,
            average_latency_ms: self.average_latency_ms(),
            consecutive_failures: self.consecutive_failures(),
            total_tokens_used: self.total_tokens_used(),
            last_error_timestamp: self.last_error_timestamp(),
        }
    }
}

fn rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        1.0
    } else {
        successful as f64 / total as f64
    }
}
