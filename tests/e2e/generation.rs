//! E2E tests for routed generation
//!
//! These tests make real API calls and require API keys.

#[cfg(test)]
mod tests {
    use crate::common::providers::available_kinds;
    use futures::StreamExt;
    use support_router::config::ProviderConfig;
    use support_router::{Config, GenerationRequest, ProviderKind, Router};

    fn request() -> GenerationRequest {
        GenerationRequest::new("Reply with the single word: pong")
            .with_system_prompt("You are a terse support assistant.")
            .with_max_tokens(16)
    }

    fn single_provider_router(kind: ProviderKind) -> Router {
        let config = Config {
            providers: vec![ProviderConfig::new(kind.as_str(), kind)],
            ..Default::default()
        };
        Router::from_config(&config).expect("valid config")
    }

    async fn generate_with(kind: ProviderKind) {
        crate::skip_without_api_key!(kind);

        let router = single_provider_router(kind);
        let response = router.generate(&request()).await.unwrap();

        assert_eq!(response.provider, kind.as_str());
        assert!(!response.text.trim().is_empty());
        assert!(response.usage.total_tokens > 0);
        println!("{} ({}): {}", kind, response.model_used, response.text);
    }

    #[tokio::test]
    #[ignore]
    async fn test_openai_generate() {
        generate_with(ProviderKind::OpenAI).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_anthropic_generate() {
        generate_with(ProviderKind::Anthropic).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_gemini_generate() {
        generate_with(ProviderKind::Gemini).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_stream_from_any_available_provider() {
        let kinds = available_kinds();
        if kinds.is_empty() {
            eprintln!("Skipping test: no provider API keys set");
            return;
        }

        let config = Config {
            providers: kinds
                .iter()
                .map(|kind| ProviderConfig::new(kind.as_str(), *kind))
                .collect(),
            ..Default::default()
        };
        let router = std::sync::Arc::new(Router::from_config(&config).unwrap());

        let mut stream = router.generate_stream(request()).unwrap();
        let mut fragments = 0;
        let mut text = String::new();
        while let Some(fragment) = stream.next().await {
            text.push_str(&fragment.unwrap());
            fragments += 1;
        }

        assert!(fragments > 0);
        assert!(!text.trim().is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_failover_from_bad_key() {
        let Some(kind) = available_kinds().into_iter().next() else {
            eprintln!("Skipping test: no provider API keys set");
            return;
        };

        let broken = ProviderConfig {
            api_key: Some("invalid-key".to_string()),
            ..ProviderConfig::new("broken", kind)
        };
        let config = Config {
            providers: vec![broken, ProviderConfig::new("working", kind)],
            ..Default::default()
        };
        let router = Router::from_config(&config).unwrap();

        let response = router.generate(&request()).await.unwrap();
        assert_eq!(response.provider, "working");
        assert!(response.is_fallback);
        assert_eq!(response.attempt_count, 2);
    }
}
