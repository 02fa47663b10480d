//! Provider test utilities for live tests

use support_router::ProviderKind;

/// API key for a provider kind from its environment variables
pub fn get_api_key(kind: ProviderKind) -> Option<String> {
    kind.api_key_env_vars()
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .filter(|key| !key.trim().is_empty())
}

/// Check if API key is available for a provider kind
pub fn has_api_key(kind: ProviderKind) -> bool {
    get_api_key(kind).is_some()
}

/// Kinds with an API key set
pub fn available_kinds() -> Vec<ProviderKind> {
    ProviderKind::ALL
        .into_iter()
        .filter(|kind| has_api_key(*kind))
        .collect()
}
