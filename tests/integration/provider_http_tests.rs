//! Backend adapters against mock HTTP servers

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{
        TEST_KEY, anthropic_reply, gemini_reply, openai_chunk, openai_reply, sse_body,
    };
    use crate::common::{mock_provider, router_for};
    use serde_json::json;
    use support_router::{GenerationRequest, ProviderError, ProviderKind, RouterError};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest::new("Where is my order #1042?")
            .with_system_prompt("You are a support bot")
            .with_max_tokens(256)
    }

    #[tokio::test]
    async fn test_openai_generate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", format!("Bearer {}", TEST_KEY).as_str()))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 256,
                "messages": [
                    { "role": "system", "content": "You are a support bot" },
                    { "role": "user", "content": "Where is my order #1042?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("It shipped.")))
            .expect(1)
            .mount(&server)
            .await;

        let router = router_for(vec![mock_provider("openai", ProviderKind::OpenAI, &server)]);
        let response = router.generate(&request()).await.unwrap();

        assert_eq!(response.text, "It shipped.");
        assert_eq!(response.provider, "openai");
        assert_eq!(response.usage.prompt_tokens, 12);
        assert_eq!(response.usage.completion_tokens, 7);
        assert!(!response.usage.estimated);
        assert_eq!(response.attempt_count, 1);

        let stats = router.get_provider_stats();
        assert_eq!(stats["openai"].stats.successful_requests, 1);
        assert_eq!(stats["openai"].stats.total_tokens_used, 19);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_in_place() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "0")
                    .set_body_json(json!({ "error": { "message": "slow down" } })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("Retried fine.")))
            .mount(&server)
            .await;

        let router = router_for(vec![mock_provider("openai", ProviderKind::OpenAI, &server)]);
        let response = router.generate(&request()).await.unwrap();

        assert_eq!(response.text, "Retried fine.");
        assert_eq!(response.attempt_count, 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);

        let stats = &router.get_provider_stats()["openai"].stats;
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 0);
    }

    #[tokio::test]
    async fn test_authentication_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "error": { "message": "Incorrect API key" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let router = router_for(vec![mock_provider("openai", ProviderKind::OpenAI, &server)]);
        let err = router.generate(&request()).await.unwrap_err();

        assert_eq!(err.attempts(), 1);
        assert!(matches!(
            err.last_error(),
            Some(ProviderError::Authentication { .. })
        ));
    }

    #[tokio::test]
    async fn test_anthropic_generate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", TEST_KEY))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "system": "You are a support bot",
                "max_tokens": 256,
                "messages": [{ "role": "user", "content": "Where is my order #1042?" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("On its way.")))
            .expect(1)
            .mount(&server)
            .await;

        let router = router_for(vec![mock_provider(
            "claude",
            ProviderKind::Anthropic,
            &server,
        )]);
        let response = router.generate(&request()).await.unwrap();

        assert_eq!(response.text, "On its way.");
        assert_eq!(response.provider, "claude");
        assert_eq!(response.usage.total_tokens, 29);
    }

    #[tokio::test]
    async fn test_gemini_generate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", TEST_KEY))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "You are a support bot" }] },
                "generationConfig": { "maxOutputTokens": 256 }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(gemini_reply("Arriving Friday.")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let router = router_for(vec![mock_provider("gemini", ProviderKind::Gemini, &server)]);
        let response = router.generate(&request()).await.unwrap();

        assert_eq!(response.text, "Arriving Friday.");
        assert_eq!(response.usage.total_tokens, 12);
    }

    #[tokio::test]
    async fn test_rejected_request_fails_over_to_next_backend() {
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": { "message": "context too long" } })),
            )
            .expect(1)
            .mount(&openai)
            .await;

        let anthropic = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(anthropic_reply("Fallback answer.")),
            )
            .mount(&anthropic)
            .await;

        let router = router_for(vec![
            mock_provider("openai", ProviderKind::OpenAI, &openai),
            mock_provider("anthropic", ProviderKind::Anthropic, &anthropic),
        ]);
        let response = router.generate(&request()).await.unwrap();

        assert_eq!(response.provider, "anthropic");
        assert_eq!(response.attempt_count, 2);
        assert!(response.is_fallback);
        assert!(response.previous_error.unwrap().contains("context too long"));
    }

    #[tokio::test]
    async fn test_content_filter_fails_over() {
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "" }, "finish_reason": "content_filter" }]
            })))
            .mount(&openai)
            .await;

        let gemini = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Safe answer.")))
            .mount(&gemini)
            .await;

        let router = router_for(vec![
            mock_provider("openai", ProviderKind::OpenAI, &openai),
            mock_provider("gemini", ProviderKind::Gemini, &gemini),
        ]);
        let response = router.generate(&request()).await.unwrap();

        assert_eq!(response.text, "Safe answer.");
        assert!(response.is_fallback);
        assert_eq!(router.get_provider_stats()["openai"].stats.failed_requests, 1);
    }

    #[tokio::test]
    async fn test_openai_stream() {
        let server = MockServer::start().await;
        let chunks = [openai_chunk("Your order "), openai_chunk("shipped today.")];
        let body = sse_body(chunks.iter().map(String::as_str).chain(["[DONE]"]));
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({ "stream": true })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let router = router_for(vec![mock_provider("openai", ProviderKind::OpenAI, &server)]);
        let text = router
            .generate_stream(request())
            .unwrap()
            .collect_text()
            .await
            .unwrap();

        assert_eq!(text, "Your order shipped today.");
        let stats = &router.get_provider_stats()["openai"].stats;
        assert_eq!(stats.successful_requests, 1);
        assert!(stats.total_tokens_used > 0);
    }

    #[tokio::test]
    async fn test_anthropic_stream() {
        let server = MockServer::start().await;
        let body = [
            ("message_start", json!({ "type": "message_start", "message": { "id": "msg_1" } })),
            (
                "content_block_delta",
                json!({ "type": "content_block_delta", "index": 0, "delta": { "type": "text_delta", "text": "Hello" } }),
            ),
            (
                "content_block_delta",
                json!({ "type": "content_block_delta", "index": 0, "delta": { "type": "text_delta", "text": " there" } }),
            ),
            ("message_stop", json!({ "type": "message_stop" })),
        ]
        .iter()
        .map(|(event, data)| format!("event: {}\ndata: {}\n\n", event, data))
        .collect::<String>();

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let router = router_for(vec![mock_provider("claude", ProviderKind::Anthropic, &server)]);
        let text = router
            .generate_stream(request())
            .unwrap()
            .collect_text()
            .await
            .unwrap();
        assert_eq!(text, "Hello there");
    }

    #[tokio::test]
    async fn test_gemini_stream() {
        let server = MockServer::start().await;
        let parts = [
            json!({ "candidates": [{ "content": { "parts": [{ "text": "Check " }] } }] }).to_string(),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "your inbox." }] }, "finishReason": "STOP" }] })
                .to_string(),
        ];
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(sse_body(parts.iter().map(String::as_str)), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let router = router_for(vec![mock_provider("gemini", ProviderKind::Gemini, &server)]);
        let text = router
            .generate_stream(request())
            .unwrap()
            .collect_text()
            .await
            .unwrap();
        assert_eq!(text, "Check your inbox.");
    }

    #[tokio::test]
    async fn test_stream_error_status_fails_over() {
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&openai)
            .await;

        let gemini = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                sse_body([json!({ "candidates": [{ "content": { "parts": [{ "text": "Backup." }] } }] })
                    .to_string()
                    .as_str()]),
                "text/event-stream",
            ))
            .mount(&gemini)
            .await;

        let router = router_for(vec![
            mock_provider("openai", ProviderKind::OpenAI, &openai),
            mock_provider("gemini", ProviderKind::Gemini, &gemini),
        ]);
        let text = router
            .generate_stream(request())
            .unwrap()
            .collect_text()
            .await
            .unwrap();
        assert_eq!(text, "Backup.");
    }

    #[tokio::test]
    async fn test_all_backends_down_exhausts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let router = router_for(vec![
            mock_provider("openai", ProviderKind::OpenAI, &server),
            mock_provider("claude", ProviderKind::Anthropic, &server),
        ]);
        let err = router.generate(&request()).await.unwrap_err();

        match err {
            RouterError::Exhausted {
                attempts,
                last_error: Some(last),
            } => {
                assert_eq!(attempts, 2);
                assert!(last.is_retryable());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Each provider retried in place up to the policy limit
        assert_eq!(server.received_requests().await.unwrap().len(), 6);
    }
}
