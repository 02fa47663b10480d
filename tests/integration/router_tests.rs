//! Router wiring and health reporting over mock backends

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{anthropic_reply, openai_reply};
    use crate::common::{config_for, mock_provider, router_for};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use support_router::core::router::OverallStatus;
    use support_router::{GenerationRequest, ProviderKind, Router};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn failing_server(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string("rejected"))
            .mount(&server)
            .await;
        server
    }

    async fn answering_server(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_from_config_keeps_registration_order_and_priority() {
        let server = MockServer::start().await;
        let mut config = config_for(vec![
            mock_provider("openai", ProviderKind::OpenAI, &server),
            mock_provider("claude", ProviderKind::Anthropic, &server),
            mock_provider("gemini", ProviderKind::Gemini, &server),
        ]);
        config.router.priority = vec!["gemini".to_string()];

        let router = Router::from_config(&config).unwrap();
        let names: Vec<_> = router.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["openai", "claude", "gemini"]);
        assert_eq!(router.priority(), ["gemini", "openai", "claude"]);

        // Built-in kind tuning flows into the selector
        let policy = router.selector().policy("claude").unwrap();
        assert_eq!(policy.base_weight, 0.9);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let server = MockServer::start().await;
        let mut config = config_for(vec![mock_provider("openai", ProviderKind::OpenAI, &server)]);
        config.providers[0].policy.base_weight = Some(2.0);

        assert!(Router::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_failing_provider_is_routed_around() {
        let openai = failing_server(400).await;
        let claude = answering_server(anthropic_reply("Handled.")).await;
        let router = router_for(vec![
            mock_provider("openai", ProviderKind::OpenAI, &openai),
            mock_provider("claude", ProviderKind::Anthropic, &claude),
        ]);

        let request = GenerationRequest::new("Cancel my subscription");
        for _ in 0..3 {
            let response = router.generate(&request).await.unwrap();
            assert_eq!(response.provider, "claude");
        }

        // Once the failures pile up, claude is the first choice
        let response = router.generate(&request).await.unwrap();
        assert_eq!(response.provider, "claude");
        assert_eq!(response.attempt_count, 1);
        assert!(!response.is_fallback);

        let best = router.selector().select_best_provider(router.providers());
        assert_eq!(best.map(|p| p.name()), Some("claude"));
    }

    #[tokio::test]
    async fn test_health_report_after_sustained_failures() {
        let openai = failing_server(400).await;
        let claude = answering_server(anthropic_reply("Handled.")).await;
        let router = router_for(vec![
            mock_provider("openai", ProviderKind::OpenAI, &openai),
            mock_provider("claude", ProviderKind::Anthropic, &claude),
        ]);
        let openai_provider = Arc::clone(router.provider("openai").unwrap());

        // Drive openai directly until its streak crosses the health gate
        let request = GenerationRequest::new("Where is my refund?");
        for _ in 0..5 {
            assert!(openai_provider.generate(&request).await.is_err());
        }

        let report = router.health_check();
        assert_eq!(report.overall_status, OverallStatus::Healthy);
        assert_eq!(report.healthy_providers, 1);

        let json = serde_json::to_value(router.get_provider_stats()).unwrap();
        assert_eq!(json["openai"]["is_healthy"], json!(false));
        assert_eq!(json["openai"]["consecutive_failures"], json!(5));
        assert_eq!(json["claude"]["is_healthy"], json!(true));
        assert_eq!(json["claude"]["total_requests"], json!(0));
    }

    #[tokio::test]
    async fn test_generate_text_builds_request() {
        let openai = answering_server(openai_reply("Sure.")).await;
        let router = router_for(vec![mock_provider("openai", ProviderKind::OpenAI, &openai)]);

        let response = router
            .generate_text("Can I change my address?", Some("Be brief".into()), 64, 0.0)
            .await
            .unwrap();
        assert_eq!(response.text, "Sure.");

        let received = openai.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["messages"][0]["content"], "Be brief");
    }

    #[tokio::test]
    async fn test_model_override_outside_catalogue_uses_default() {
        let openai = answering_server(openai_reply("ok")).await;
        let router = router_for(vec![mock_provider("openai", ProviderKind::OpenAI, &openai)]);

        let request = GenerationRequest::new("hi").with_model("claude-3-opus");
        router.generate(&request).await.unwrap();

        let received = openai.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_concurrent_requests_over_http() {
        let openai = answering_server(openai_reply("parallel")).await;
        let router = router_for(vec![mock_provider("openai", ProviderKind::OpenAI, &openai)]);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    router
                        .generate(&GenerationRequest::new(format!("question {}", i)))
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let stats = &router.get_provider_stats()["openai"].stats;
        assert_eq!(stats.total_requests, 8);
        assert_eq!(stats.successful_requests, 8);
    }
}
