//! Health and statistics reports
//!
//! Plain serialisable views over the live provider state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::stats::ProviderStatsSnapshot;
use crate::core::providers::traits::GenerationProvider;

/// Statistics of one provider with its gate flags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStatusReport {
    pub is_healthy: bool,
    pub has_credentials: bool,
    #[serde(flatten)]
    pub stats: ProviderStatsSnapshot,
}

impl ProviderStatusReport {
    pub fn of(provider: &dyn GenerationProvider) -> Self {
        Self {
            is_healthy: provider.is_healthy(),
            has_credentials: provider.has_credentials(),
            stats: provider.stats().snapshot(),
        }
    }
}

/// Router-wide status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// At least one credentialed provider is healthy
    Healthy,
    /// Credentialed providers exist but none is healthy
    Unhealthy,
    /// No provider has credentials
    NoProviders,
}

/// Per-provider status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderHealthStatus {
    Healthy,
    Unhealthy,
    /// No credentials configured
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderHealth {
    pub status: ProviderHealthStatus,
    pub success_rate: f64,
    pub consecutive_failures: u32,
    pub average_latency_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub overall_status: OverallStatus,
    pub healthy_providers: usize,
    pub total_providers: usize,
    pub providers: BTreeMap<String, ProviderHealth>,
}

impl HealthReport {
    pub fn from_providers(providers: &[Arc<dyn GenerationProvider>]) -> Self {
        let mut report = BTreeMap::new();
        let mut configured = 0;
        let mut healthy = 0;

        for provider in providers {
            let status = if !provider.has_credentials() {
                ProviderHealthStatus::Unconfigured
            } else if provider.is_healthy() {
                ProviderHealthStatus::Healthy
            } else {
                ProviderHealthStatus::Unhealthy
            };

            if status != ProviderHealthStatus::Unconfigured {
                configured += 1;
            }
            if status == ProviderHealthStatus::Healthy {
                healthy += 1;
            }

            let stats = provider.stats();
            report.insert(
                provider.name().to_string(),
                ProviderHealth {
                    status,
                    success_rate: stats.success_rate(),
                    consecutive_failures: stats.consecutive_failures(),
                    average_latency_ms: stats.average_latency_ms(),
                },
            );
        }

        let overall_status = if configured == 0 {
            OverallStatus::NoProviders
        } else if healthy > 0 {
            OverallStatus::Healthy
        } else {
            OverallStatus::Unhealthy
        };

        Self {
            overall_status,
            healthy_providers: healthy,
            total_providers: report.len(),
            providers: report,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status == OverallStatus::Healthy
    }
}
