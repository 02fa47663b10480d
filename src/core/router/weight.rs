//! Provider weight policy
//!
//! Static per-provider tuning plus the scoring and exclusion functions the
//! selector applies to a stats snapshot. Scoring is multiplicative: one bad
//! dimension (reliability, latency, recent failures) drags the weight down
//! on its own. `should_exclude` is a hard cutoff layered on top.

use super::stats::ProviderStatsSnapshot;
use crate::core::providers::ProviderKind;
use serde::{Deserialize, Serialize};

/// Requests needed before the success rate is trusted for exclusion
pub const EXCLUSION_MIN_REQUESTS: u64 = 10;

/// Success rate below which a provider with enough history is excluded
pub const EXCLUSION_SUCCESS_RATE: f64 = 0.3;

/// Lower bound for the latency and failure factors
const FACTOR_FLOOR: f64 = 0.1;

/// Tuning parameters for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderWeightPolicy {
    /// Provider this policy applies to
    pub provider_name: String,
    /// Static preference in [0, 1]
    pub base_weight: f64,
    /// Multiplier applied after all dynamic factors
    pub performance_multiplier: f64,
    /// Relative cost efficiency; reported only, not used for scoring
    pub cost_efficiency: f64,
    /// Average latency above which the latency factor decays
    pub latency_threshold_ms: f64,
    /// Consecutive failures that exclude the provider outright
    pub max_consecutive_failures: u32,
}

impl ProviderWeightPolicy {
    /// Policy with neutral tuning
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            base_weight: 1.0,
            performance_multiplier: 1.0,
            cost_efficiency: 1.0,
            latency_threshold_ms: 5000.0,
            max_consecutive_failures: 3,
        }
    }

    /// Built-in tuning for a backend kind
    pub fn for_kind(provider_name: impl Into<String>, kind: ProviderKind) -> Self {
        let base = Self::new(provider_name);
        match kind {
            ProviderKind::OpenAI => Self {
                base_weight: 1.0,
                cost_efficiency: 0.8,
                latency_threshold_ms: 5000.0,
                ..base
            },
            ProviderKind::Anthropic => Self {
                base_weight: 0.9,
                cost_efficiency: 0.7,
                latency_threshold_ms: 6000.0,
                ..base
            },
            ProviderKind::Gemini => Self {
                base_weight: 0.8,
                cost_efficiency: 0.9,
                latency_threshold_ms: 5000.0,
                ..base
            },
        }
    }

    /// Set the base weight (builder pattern)
    pub fn with_base_weight(mut self, base_weight: f64) -> Self {
        self.base_weight = base_weight;
        self
    }

    /// Set the consecutive failure cutoff (builder pattern)
    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = max;
        self
    }

    /// Set the latency threshold (builder pattern)
    pub fn with_latency_threshold_ms(mut self, threshold: f64) -> Self {
        self.latency_threshold_ms = threshold;
        self
    }

    /// Set the performance multiplier (builder pattern)
    pub fn with_performance_multiplier(mut self, multiplier: f64) -> Self {
        self.performance_multiplier = multiplier;
        self
    }

    /// Score a provider in [0, 1] from its live statistics
    ///
    /// A provider with no history gets `base_weight` unmodified.
    pub fn calculate_dynamic_weight(&self, stats: &ProviderStatsSnapshot) -> f64 {
        if stats.total_requests == 0 {
            return self.base_weight;
        }

        let success_weight = stats.success_rate;

        let latency_weight = if stats.average_latency_ms <= self.latency_threshold_ms {
            1.0
        } else {
            (self.latency_threshold_ms / stats.average_latency_ms).max(FACTOR_FLOOR)
        };

        let failure_penalty = if stats.consecutive_failures == 0 {
            1.0
        } else {
            let ratio = stats.consecutive_failures as f64 / self.max_consecutive_failures as f64;
            (1.0 - ratio).max(FACTOR_FLOOR)
        };

        let weight = self.base_weight
            * success_weight
            * latency_weight
            * failure_penalty
            * self.performance_multiplier;

        weight.clamp(0.0, 1.0)
    }

    /// Hard cutoff regardless of the computed weight
    pub fn should_exclude(&self, stats: &ProviderStatsSnapshot) -> bool {
        if stats.consecutive_failures >= self.max_consecutive_failures {
            return true;
        }

        stats.total_requests >= EXCLUSION_MIN_REQUESTS
            && stats.success_rate < EXCLUSION_SUCCESS_RATE
    }
}
