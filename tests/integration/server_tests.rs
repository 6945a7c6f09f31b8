//! Front door integration tests
//!
//! Full actix app over a gateway whose targets are wiremock backends.

#[cfg(test)]
mod tests {
    use crate::common::*;
    use actix_web::{test, web};
    use serde_json::{Value, json};
    use switchyard::config::Config;
    use switchyard::core::Gateway;
    use switchyard::core::router::{StrategyConfig, TargetConfig};
    use switchyard::core::target::Provider;
    use switchyard::server::routes::headers;
    use switchyard::server::{AppState, HttpServer};

    async fn state_with_routing(routing: Option<StrategyConfig>) -> web::Data<AppState> {
        let mut config = Config::default();
        config.gateway.routing = routing;
        let gateway = Gateway::new(config).await.unwrap();
        web::Data::new(AppState::new(gateway))
    }

    fn routing_to(base_url: &str) -> StrategyConfig {
        StrategyConfig::single(TargetConfig {
            custom_host: Some(base_url.to_string()),
            ..TargetConfig::new(Provider::OpenAi)
        })
    }

    fn chat_body(prompt: &str) -> Value {
        json!({
            "model": "test-model",
            "messages": [{"role": "user", "content": prompt}]
        })
    }

    fn header_str<'a, B>(resp: &'a actix_web::dev::ServiceResponse<B>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[actix_web::test]
    async fn test_configured_routing_then_cache_hit() {
        let backend = openai_backend_expecting(200, openai_completion("pong"), 1).await;
        let state = state_with_routing(Some(routing_to(&backend.uri()))).await;
        let app = test::init_service(HttpServer::create_app(state)).await;

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(chat_body("ping"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(header_str(&resp, headers::SERVED_BY), Some("openai"));
        assert_eq!(header_str(&resp, headers::CACHE_STATUS), Some("miss"));
        assert_eq!(header_str(&resp, headers::ATTEMPTS), Some("1"));
        assert_eq!(header_str(&resp, headers::TARGET_INDEX), Some("0"));
        assert!(header_str(&resp, headers::REQUEST_ID).is_some());
        assert!(header_str(&resp, headers::LATENCY_MS).is_some());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["choices"][0]["message"]["content"], "pong");

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(chat_body("ping"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(header_str(&resp, headers::SERVED_BY), Some("cache"));
        assert_eq!(header_str(&resp, headers::CACHE_STATUS), Some("hit"));
        assert_eq!(header_str(&resp, headers::ATTEMPTS), Some("0"));
        assert!(header_str(&resp, headers::TARGET_INDEX).is_none());

        let req = test::TestRequest::delete().uri("/v1/cache").to_request();
        let cleared: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cleared, json!({"cleared": 1}));
    }

    #[actix_web::test]
    async fn test_header_strategy_overrides_configured_routing() {
        let configured = openai_backend_expecting(200, openai_completion("configured"), 0).await;
        let primary = openai_backend(503, json!({"error": "busy"})).await;
        let secondary = openai_backend(200, openai_completion("from header")).await;

        let state = state_with_routing(Some(routing_to(&configured.uri()))).await;
        let app = test::init_service(HttpServer::create_app(state)).await;

        let document = json!({
            "strategy": {"mode": "fallback"},
            "targets": [
                {"provider": "openai", "custom_host": primary.uri()},
                {"provider": "openai", "custom_host": secondary.uri()}
            ],
            "cache": {"mode": "disabled"}
        });

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .insert_header((headers::CONFIG, document.to_string()))
            .set_json(chat_body("hi"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(header_str(&resp, headers::ATTEMPTS), Some("2"));
        assert_eq!(header_str(&resp, headers::TARGET_INDEX), Some("1"));
        assert_eq!(header_str(&resp, headers::CACHE_STATUS), Some("bypass"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["choices"][0]["message"]["content"], "from header");
    }

    #[actix_web::test]
    async fn test_provider_headers_with_bearer() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path(OPENAI_PATH))
            .and(wiremock::matchers::header("Authorization", "Bearer sk-client"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(openai_completion("hey")))
            .expect(1)
            .mount(&server)
            .await;

        let app = test::init_service(HttpServer::create_app(state_with_routing(None).await)).await;
        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .insert_header((headers::PROVIDER, "openai"))
            .insert_header((headers::CUSTOM_HOST, server.uri()))
            .insert_header(("Authorization", "Bearer sk-client"))
            .set_json(chat_body("hi"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn test_force_refresh_header() {
        let backend = openai_backend_expecting(200, openai_completion("again"), 2).await;
        let state = state_with_routing(Some(routing_to(&backend.uri()))).await;
        let app = test::init_service(HttpServer::create_app(state)).await;

        for expected in ["miss", "refresh"] {
            let mut req = test::TestRequest::post()
                .uri("/v1/chat/completions")
                .set_json(chat_body("same"));
            if expected == "refresh" {
                req = req.insert_header((headers::CACHE_FORCE_REFRESH, "true"));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(header_str(&resp, headers::CACHE_STATUS), Some(expected));
        }
    }

    #[actix_web::test]
    async fn test_exhaustion_is_502_with_attempts() {
        let a = openai_backend(500, json!({"error": "a"})).await;
        let b = openai_backend(503, json!({"error": "b"})).await;

        let routing = StrategyConfig {
            targets: vec![
                TargetConfig {
                    custom_host: Some(a.uri()),
                    ..TargetConfig::new(Provider::OpenAi)
                },
                TargetConfig {
                    custom_host: Some(b.uri()),
                    ..TargetConfig::new(Provider::OpenAi)
                },
            ],
            ..Default::default()
        };
        let app = test::init_service(HttpServer::create_app(state_with_routing(Some(routing)).await)).await;

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(chat_body("hi"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 502);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "ALL_PROVIDERS_EXHAUSTED");
        let attempts = body["error"]["attempts"].as_array().unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[1]["target_index"], 1);
    }

    #[actix_web::test]
    async fn test_unbounded_ttls_in_config_header_are_rejected() {
        let backend = openai_backend_expecting(200, openai_completion("never"), 0).await;
        let app = test::init_service(HttpServer::create_app(state_with_routing(None).await)).await;

        let documents = [
            json!({
                "strategy": {
                    "mode": "loadbalance",
                    "sticky_session": {"hash_fields": ["user"], "ttl": u64::MAX}
                },
                "targets": [{"provider": "openai", "custom_host": backend.uri(), "weight": 1}]
            }),
            json!({
                "provider": "openai",
                "custom_host": backend.uri(),
                "cache": {"mode": "simple", "max_age": u64::MAX}
            }),
        ];

        for document in documents {
            let req = test::TestRequest::post()
                .uri("/v1/chat/completions")
                .insert_header((headers::CONFIG, document.to_string()))
                .set_json(json!({
                    "model": "test-model",
                    "user": "alice",
                    "messages": [{"role": "user", "content": "hi"}]
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"]["code"], "INVALID_STRATEGY");
        }
    }

    #[actix_web::test]
    async fn test_override_params_get_their_own_cache_entries() {
        let backend = openai_backend_expecting(200, openai_completion("answer"), 2).await;
        let app = test::init_service(HttpServer::create_app(state_with_routing(None).await)).await;

        let pinned = |temperature: f64| {
            json!({
                "provider": "openai",
                "custom_host": backend.uri(),
                "override_params": {"temperature": temperature}
            })
            .to_string()
        };

        for (document, expected) in [
            (pinned(0.0), "miss"),
            (pinned(1.5), "miss"),
            (pinned(0.0), "hit"),
        ] {
            let req = test::TestRequest::post()
                .uri("/v1/chat/completions")
                .insert_header((headers::CONFIG, document))
                .set_json(chat_body("same prompt"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200);
            assert_eq!(header_str(&resp, headers::CACHE_STATUS), Some(expected));
        }
        assert_eq!(hits(&backend).await, 2);
    }
}
