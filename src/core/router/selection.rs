//! Provider selection logic
//!
//! Two deliberately different rules: `select_best_provider` applies every
//! gate and picks one winner, `get_fallback_order` only drops providers that
//! are clearly broken and ranks the rest.

use std::collections::HashMap;
use std::sync::Arc;

use super::weight::ProviderWeightPolicy;
use crate::core::providers::traits::GenerationProvider;

/// Consecutive failures at which a provider leaves the fallback order
pub const FALLBACK_MAX_CONSECUTIVE_FAILURES: u32 = 10;

/// Minimum weight of a provider in the fallback order
pub const FALLBACK_WEIGHT_FLOOR: f64 = 0.1;

/// Computes the preferred provider and the ranked fallback list
#[derive(Debug, Clone, Default)]
pub struct ProviderSelector {
    policies: HashMap<String, ProviderWeightPolicy>,
}

impl ProviderSelector {
    pub fn new(policies: impl IntoIterator<Item = ProviderWeightPolicy>) -> Self {
        Self {
            policies: policies
                .into_iter()
                .map(|p| (p.provider_name.clone(), p))
                .collect(),
        }
    }

    /// Add or replace the policy for one provider
    pub fn set_policy(&mut self, policy: ProviderWeightPolicy) {
        self.policies.insert(policy.provider_name.clone(), policy);
    }

    pub fn policy(&self, provider_name: &str) -> Option<&ProviderWeightPolicy> {
        self.policies.get(provider_name)
    }

    /// Dynamic weight of a provider, `None` when it has no policy
    pub fn weight_of(&self, provider: &dyn GenerationProvider) -> Option<f64> {
        self.policies
            .get(provider.name())
            .map(|policy| policy.calculate_dynamic_weight(&provider.stats().snapshot()))
    }

    /// Highest-weight provider that passes every gate
    ///
    /// Candidates must be healthy, have a policy and not be excluded by it.
    /// Ties go to the provider registered first.
    pub fn select_best_provider<'a>(
        &self,
        providers: &'a [Arc<dyn GenerationProvider>],
    ) -> Option<&'a Arc<dyn GenerationProvider>> {
        let mut best: Option<(&'a Arc<dyn GenerationProvider>, f64)> = None;

        for provider in providers {
            if !provider.is_healthy() {
                continue;
            }
            let Some(policy) = self.policies.get(provider.name()) else {
                continue;
            };

            let snapshot = provider.stats().snapshot();
            if policy.should_exclude(&snapshot) {
                continue;
            }

            let weight = policy.calculate_dynamic_weight(&snapshot);
            if best.is_none_or(|(_, best_weight)| weight > best_weight) {
                best = Some((provider, weight));
            }
        }

        best.map(|(provider, _)| provider)
    }

    /// Every remaining provider ranked by weight, best first
    ///
    /// Only `exclude` and providers with at least
    /// [`FALLBACK_MAX_CONSECUTIVE_FAILURES`] consecutive failures are
    /// dropped. Weights are floored at [`FALLBACK_WEIGHT_FLOOR`] and ties keep
    /// registration order.
    pub fn get_fallback_order<'a>(
        &self,
        providers: &'a [Arc<dyn GenerationProvider>],
        exclude: Option<&str>,
    ) -> Vec<&'a Arc<dyn GenerationProvider>> {
        let mut ranked: Vec<(&'a Arc<dyn GenerationProvider>, f64)> = providers
            .iter()
            .filter(|p| Some(p.name()) != exclude)
            .filter_map(|provider| {
                let snapshot = provider.stats().snapshot();
                if snapshot.consecutive_failures >= FALLBACK_MAX_CONSECUTIVE_FAILURES {
                    return None;
                }

                let weight = self
                    .policies
                    .get(provider.name())
                    .map(|policy| policy.calculate_dynamic_weight(&snapshot))
                    .unwrap_or(FALLBACK_WEIGHT_FLOOR)
                    .max(FALLBACK_WEIGHT_FLOOR);
                Some((provider, weight))
            })
            .collect();

        // Stable sort keeps registration order for equal weights
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().map(|(provider, _)| provider).collect()
    }
}
