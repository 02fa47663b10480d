//! Provider configuration

use crate::core::providers::ProviderKind;
use crate::core::providers::base::{BaseConfig, ModelCatalogue};
use crate::core::router::ProviderWeightPolicy;
use serde::{Deserialize, Serialize};

/// One configured backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Router-facing name, unique across the configuration
    pub name: String,
    /// Backend API flavour
    pub kind: ProviderKind,
    /// API key; falls back to the kind's environment variables
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL; falls back to `<KIND>_BASE_URL`, then the kind's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-call timeout; falls back to `<KIND>_TIMEOUT`, then 30 seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Served models; empty means the kind's built-in catalogue
    #[serde(default, skip_serializing_if = "ModelCatalogue::is_empty")]
    pub models: ModelCatalogue,
    /// Adjustments to the kind's built-in weight policy
    #[serde(default)]
    pub policy: PolicyOverrides,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            api_key: None,
            base_url: None,
            timeout_secs: None,
            models: ModelCatalogue::default(),
            policy: PolicyOverrides::default(),
        }
    }

    /// Connection settings with environment fallbacks applied
    pub fn connection(&self) -> BaseConfig {
        BaseConfig::for_provider(
            self.kind,
            self.api_key.clone(),
            self.base_url.clone(),
            self.timeout_secs,
        )
    }

    pub fn catalogue(&self) -> ModelCatalogue {
        if self.models.is_empty() {
            self.kind.default_models()
        } else {
            self.models.clone()
        }
    }

    pub fn weight_policy(&self) -> ProviderWeightPolicy {
        self.policy
            .apply(ProviderWeightPolicy::for_kind(self.name.clone(), self.kind))
    }
}

/// Optional weight policy fields; unset fields keep the kind's defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_threshold_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_failures: Option<u32>,
}

impl PolicyOverrides {
    pub fn apply(&self, policy: ProviderWeightPolicy) -> ProviderWeightPolicy {
        ProviderWeightPolicy {
            base_weight: self.base_weight.unwrap_or(policy.base_weight),
            performance_multiplier: self
                .performance_multiplier
                .unwrap_or(policy.performance_multiplier),
            cost_efficiency: self.cost_efficiency.unwrap_or(policy.cost_efficiency),
            latency_threshold_ms: self
                .latency_threshold_ms
                .unwrap_or(policy.latency_threshold_ms),
            max_consecutive_failures: self
                .max_consecutive_failures
                .unwrap_or(policy.max_consecutive_failures),
            ..policy
        }
    }
}
