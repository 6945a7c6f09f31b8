//! Upstream client integration tests
//!
//! Dialect translation, credentials, overrides and response classification.

#[cfg(test)]
mod tests {
    use crate::common::*;
    use serde_json::json;
    use std::time::Duration;
    use switchyard::core::router::FailurePolicy;
    use switchyard::core::target::ParamOverrides;
    use switchyard::core::types::GenerationParams;
    use switchyard::core::upstream::{AttemptError, UpstreamClient, UpstreamSettings};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> UpstreamClient {
        UpstreamClient::new(settings(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn test_ollama_dialect_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(OLLAMA_PATH))
            .and(body_partial_json(json!({
                "model": "llama3",
                "stream": false,
                "options": {"num_predict": 16, "temperature": 0.5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ollama_completion("hello from ollama")))
            .expect(1)
            .mount(&server)
            .await;

        let target = ollama_target(&server.uri()).with_overrides(ParamOverrides::model("llama3"));
        let request = chat_request("hi").with_params(GenerationParams {
            max_tokens: Some(16),
            temperature: Some(0.5),
            ..Default::default()
        });

        let response = client()
            .send(&target, &request, &FailurePolicy::default())
            .await
            .expect("ollama attempt should succeed");

        assert_eq!(response.text().as_deref(), Some("hello from ollama"));
        assert!(response.id.starts_with("chatcmpl-"));
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(7));
        assert_eq!(response.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_credential_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(OPENAI_PATH))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("authed")))
            .expect(1)
            .mount(&server)
            .await;

        let target = openai_target(&server.uri()).with_credential("sk-test");
        let response = client()
            .send(&target, &chat_request("hi"), &FailurePolicy::default())
            .await
            .unwrap();
        assert_eq!(response.text().as_deref(), Some("authed"));
    }

    #[tokio::test]
    async fn test_override_model_and_metadata_not_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(OPENAI_PATH))
            .and(body_partial_json(json!({"model": "gpt-4o-mini", "temperature": 0.1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("ok")))
            .mount(&server)
            .await;

        let overrides = ParamOverrides {
            model: Some("gpt-4o-mini".to_string()),
            params: GenerationParams {
                temperature: Some(0.1),
                ..Default::default()
            },
        };
        let target = openai_target(&server.uri()).with_overrides(overrides);
        let request = chat_request("hi").with_metadata("session_id", json!("s-1"));

        client()
            .send(&target, &request, &FailurePolicy::default())
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert!(body.get("metadata").is_none());
        assert!(body.get("stream").is_none());
    }

    #[tokio::test]
    async fn test_success_status_with_garbage_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(OPENAI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = client()
            .send(&openai_target(&server.uri()), &chat_request("hi"), &FailurePolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let server = openai_backend(200, json!({"id": "x", "choices": []})).await;
        let err = client()
            .send(&openai_target(&server.uri()), &chat_request("hi"), &FailurePolicy::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let server = openai_backend(429, json!({"error": {"message": "slow down"}})).await;
        let err = client()
            .send(&openai_target(&server.uri()), &chat_request("hi"), &FailurePolicy::default())
            .await
            .unwrap_err();

        match err {
            AttemptError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("slow down"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_permits_returned_after_attempt() {
        let server = openai_backend(200, openai_completion("ok")).await;
        let client = UpstreamClient::new(UpstreamSettings {
            max_concurrent_per_target: 2,
            ..UpstreamSettings::default()
        })
        .unwrap();
        let target = openai_target(&server.uri());

        assert_eq!(client.available_permits(&target), 2);
        client
            .send(&target, &chat_request("hi"), &FailurePolicy::default())
            .await
            .unwrap();
        assert_eq!(client.available_permits(&target), 2);
    }
}
