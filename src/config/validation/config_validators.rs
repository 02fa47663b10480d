//! Validators for the router, provider and logging sections

use super::endpoint::validate_base_url;
use super::trait_def::Validate;
use crate::config::Config;
use crate::config::models::*;
use std::collections::HashSet;
use tracing::{debug, warn};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Validate for Config {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating router configuration");

        if self.providers.is_empty() {
            warn!("No providers configured; every request will fail");
        }

        let mut provider_names = HashSet::new();
        for provider in &self.providers {
            if !provider_names.insert(provider.name.as_str()) {
                return Err(format!("Duplicate provider name: {}", provider.name));
            }
            provider.validate()?;
        }

        self.router.validate()?;
        for name in &self.router.priority {
            if !provider_names.contains(name.as_str()) {
                return Err(format!("Priority lists unknown provider: {}", name));
            }
        }

        self.logging.validate()?;

        debug!("Router configuration validation completed");
        Ok(())
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating provider configuration for: {}", self.name);

        if self.name.trim().is_empty() {
            return Err("Provider name cannot be empty".to_string());
        }

        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url, &format!("Provider {} base_url", self.name))?;
        }

        if self.timeout_secs == Some(0) {
            return Err(format!("Provider {} timeout must be greater than 0", self.name));
        }

        for model in self.models.models() {
            if self.models.get(model).is_some_and(|spec| spec.max_tokens == 0) {
                return Err(format!(
                    "Provider {} model {} must allow at least one token",
                    self.name, model
                ));
            }
        }

        let policy = self.weight_policy();
        if !(0.0..=1.0).contains(&policy.base_weight) {
            return Err(format!(
                "Provider {} base_weight must be between 0 and 1, got {}",
                self.name, policy.base_weight
            ));
        }
        if policy.performance_multiplier <= 0.0 || !policy.performance_multiplier.is_finite() {
            return Err(format!(
                "Provider {} performance_multiplier must be greater than 0",
                self.name
            ));
        }
        if policy.latency_threshold_ms <= 0.0 || !policy.latency_threshold_ms.is_finite() {
            return Err(format!(
                "Provider {} latency_threshold_ms must be greater than 0",
                self.name
            ));
        }
        if policy.max_consecutive_failures == 0 {
            return Err(format!(
                "Provider {} max_consecutive_failures must be at least 1",
                self.name
            ));
        }
        if policy.cost_efficiency < 0.0 {
            return Err(format!(
                "Provider {} cost_efficiency cannot be negative",
                self.name
            ));
        }

        Ok(())
    }
}

impl Validate for RouterConfig {
    fn validate(&self) -> Result<(), String> {
        self.retry.validate()?;

        if self.stream_buffer == 0 {
            return Err("Stream buffer must be greater than 0".to_string());
        }

        let mut seen = HashSet::new();
        for name in &self.priority {
            if !seen.insert(name.as_str()) {
                return Err(format!("Priority lists provider twice: {}", name));
            }
        }

        Ok(())
    }
}

impl Validate for RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Retry max_attempts must be at least 1".to_string());
        }

        if self.backoff_multiplier < 1.0 || !self.backoff_multiplier.is_finite() {
            return Err("Retry backoff_multiplier must be at least 1.0".to_string());
        }

        if self.base_delay_ms > self.max_delay_ms {
            return Err(format!(
                "Retry base_delay_ms ({}) exceeds max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            ));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let level = self.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(format!(
                "Unknown log level '{}', expected one of {}",
                self.level,
                LOG_LEVELS.join(", ")
            ));
        }
        Ok(())
    }
}
