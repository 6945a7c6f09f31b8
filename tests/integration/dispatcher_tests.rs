//! Dispatcher integration tests
//!
//! Fallback ordering, exhaustion, caching, timeouts, cancellation and
//! weighted/sticky selection against mock backends.

#[cfg(test)]
mod tests {
    use crate::common::*;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use switchyard::core::dispatcher::{CacheStatus, DispatchError, DispatchOptions, ServedBy};
    use switchyard::core::router::{FailurePolicy, StickySession, Strategy};
    use switchyard::core::target::Provider;
    use tokio_util::sync::CancellationToken;

    // ==================== Fallback Tests ====================

    #[tokio::test]
    async fn test_fallback_after_server_error() {
        let primary = openai_backend(503, json!({"error": "overloaded"})).await;
        let secondary = openai_backend(200, openai_completion("ok")).await;

        let strategy = Strategy::fallback(vec![
            openai_target(&primary.uri()),
            openai_target(&secondary.uri()),
        ])
        .unwrap();

        let outcome = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .expect("fallback should succeed");

        assert_eq!(outcome.response.text().as_deref(), Some("ok"));
        assert_eq!(outcome.served_by.target_index(), Some(1));
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(
            outcome.attempts[0].error.as_ref().and_then(|e| e.status_code()),
            Some(503)
        );
        assert!(outcome.attempts[1].succeeded());
        assert_eq!(outcome.cache_status, CacheStatus::Bypass);
    }

    #[tokio::test]
    async fn test_candidates_tried_in_order_once_each() {
        let a = openai_backend(500, json!({"error": "a"})).await;
        let b = openai_backend(429, json!({"error": "b"})).await;
        let c = openai_backend(200, openai_completion("from c")).await;

        let strategy = Strategy::fallback(vec![
            openai_target(&a.uri()),
            openai_target(&b.uri()),
            openai_target(&c.uri()),
        ])
        .unwrap();

        let outcome = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.served_by.target_index(), Some(2));
        let order: Vec<usize> = outcome.attempts.iter().map(|a| a.target_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(hits(&a).await, 1);
        assert_eq!(hits(&b).await, 1);
        assert_eq!(hits(&c).await, 1);
    }

    #[tokio::test]
    async fn test_success_stops_the_walk() {
        let a = openai_backend(200, openai_completion("first")).await;
        let b = openai_backend_expecting(200, openai_completion("second"), 0).await;

        let strategy =
            Strategy::fallback(vec![openai_target(&a.uri()), openai_target(&b.uri())]).unwrap();

        let outcome = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.response.text().as_deref(), Some("first"));
        assert_eq!(outcome.attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_falls_through() {
        let live = openai_backend(200, openai_completion("alive")).await;
        let strategy = Strategy::fallback(vec![dead_target(), openai_target(&live.uri())]).unwrap();

        let outcome = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.served_by.target_index(), Some(1));
        assert_eq!(outcome.attempts[0].error.as_ref().map(|e| e.kind()), Some("network"));
    }

    #[tokio::test]
    async fn test_failure_policy_limits_failover_codes() {
        // 500 is outside the policy, so a decodable body is accepted.
        let a = openai_backend(500, openai_completion("degraded")).await;
        let b = openai_backend_expecting(200, openai_completion("unused"), 0).await;

        let strategy = Strategy::fallback(vec![openai_target(&a.uri()), openai_target(&b.uri())])
            .unwrap()
            .with_failure_policy(FailurePolicy::on_status_codes([429]).unwrap());

        let outcome = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.response.text().as_deref(), Some("degraded"));
        assert_eq!(outcome.served_by.target_index(), Some(0));
    }

    // ==================== Exhaustion Tests ====================

    #[tokio::test]
    async fn test_exhaustion_reports_every_attempt() {
        let a = openai_backend(500, json!({"error": "a"})).await;
        let b = openai_backend(502, json!({"error": "b"})).await;

        let strategy =
            Strategy::fallback(vec![openai_target(&a.uri()), openai_target(&b.uri())]).unwrap();

        let err = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap_err();

        match &err {
            DispatchError::AllProvidersExhausted { attempts } => {
                assert_eq!(attempts.len(), 2);
                assert!(attempts.iter().all(|a| !a.succeeded()));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("exhausted"));
        assert!(message.contains("502"));
    }

    #[tokio::test]
    async fn test_exhaustion_is_not_cached() {
        let a = openai_backend(500, json!({"error": "down"})).await;
        let strategy = Strategy::single(openai_target(&a.uri()));
        let dispatcher = cached_dispatcher();

        for _ in 0..2 {
            let err = dispatcher
                .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
                .await
                .unwrap_err();
            assert!(matches!(err, DispatchError::AllProvidersExhausted { .. }));
        }
        assert_eq!(hits(&a).await, 2);
    }

    // ==================== Cache Tests ====================

    #[tokio::test]
    async fn test_identical_requests_reach_upstream_once() {
        let backend = openai_backend_expecting(200, openai_completion("cached"), 1).await;
        let strategy = Strategy::single(openai_target(&backend.uri()));
        let dispatcher = cached_dispatcher();

        let first = dispatcher
            .dispatch(&chat_request("same"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(first.cache_status, CacheStatus::Miss);

        let second = dispatcher
            .dispatch(&chat_request("same"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.served_by, ServedBy::Cache);
        assert!(second.attempts.is_empty());
        assert_eq!(second.response, first.response);
    }

    #[tokio::test]
    async fn test_different_prompts_do_not_share_entries() {
        let backend = openai_backend_expecting(200, openai_completion("x"), 2).await;
        let strategy = Strategy::single(openai_target(&backend.uri()));
        let dispatcher = cached_dispatcher();

        for prompt in ["one", "two"] {
            let outcome = dispatcher
                .dispatch(&chat_request(prompt), Some(&strategy), &DispatchOptions::default())
                .await
                .unwrap();
            assert_eq!(outcome.cache_status, CacheStatus::Miss);
        }
    }

    #[tokio::test]
    async fn test_force_refresh_goes_upstream_and_restores() {
        let backend = openai_backend_expecting(200, openai_completion("fresh"), 2).await;
        let strategy = Strategy::single(openai_target(&backend.uri()));
        let dispatcher = cached_dispatcher();

        dispatcher
            .dispatch(&chat_request("q"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();

        let refresh = DispatchOptions {
            force_refresh: true,
            ..Default::default()
        };
        let refreshed = dispatcher
            .dispatch(&chat_request("q"), Some(&strategy), &refresh)
            .await
            .unwrap();
        assert_eq!(refreshed.cache_status, CacheStatus::Refresh);

        let hit = dispatcher
            .dispatch(&chat_request("q"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(hit.cache_status, CacheStatus::Hit);
    }

    // ==================== Timeout and Cancellation Tests ====================

    #[tokio::test]
    async fn test_slow_target_times_out_then_falls_back() {
        let slow = slow_backend(openai_completion("late"), Duration::from_secs(3)).await;
        let fast = openai_backend(200, openai_completion("fast")).await;

        let strategy =
            Strategy::fallback(vec![openai_target(&slow.uri()), openai_target(&fast.uri())]).unwrap();

        let started = Instant::now();
        let outcome = dispatcher_with(settings(Duration::from_millis(200)))
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(outcome.response.text().as_deref(), Some("fast"));
        assert!(outcome.attempts[0].error.as_ref().is_some_and(|e| e.is_timeout()));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_attempt() {
        let slow = slow_backend(openai_completion("late"), Duration::from_secs(5)).await;
        let never = openai_backend_expecting(200, openai_completion("unused"), 0).await;

        let strategy =
            Strategy::fallback(vec![openai_target(&slow.uri()), openai_target(&never.uri())]).unwrap();

        let cancel = CancellationToken::new();
        let options = DispatchOptions {
            cancel: cancel.clone(),
            force_refresh: false,
        };

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });

        let started = Instant::now();
        let err = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &options)
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(2));
        match err {
            DispatchError::Cancelled { attempts } => {
                assert_eq!(attempts.len(), 1);
                assert_eq!(attempts[0].error.as_ref().map(|e| e.kind()), Some("cancelled"));
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
    }

    // ==================== Load Balance Tests ====================

    #[tokio::test]
    async fn test_weighted_split_favours_heavier_target() {
        let heavy = openai_backend(200, openai_completion("heavy")).await;
        let light = openai_backend(200, openai_completion("light")).await;

        let strategy = Strategy::load_balance(vec![
            openai_target(&heavy.uri()).with_weight(0.8).unwrap(),
            openai_target(&light.uri()).with_weight(0.2).unwrap(),
        ])
        .unwrap();

        let dispatcher = dispatcher();
        for _ in 0..200 {
            dispatcher
                .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
                .await
                .unwrap();
        }

        let heavy_hits = hits(&heavy).await;
        let light_hits = hits(&light).await;
        assert_eq!(heavy_hits + light_hits, 200);
        assert!(heavy_hits > light_hits);
        assert!(light_hits > 0);
    }

    #[tokio::test]
    async fn test_load_balance_falls_over_to_other_targets() {
        let broken = openai_backend(500, json!({"error": "down"})).await;
        let healthy = openai_backend(200, openai_completion("spare")).await;

        // Zero weight: never chosen first, still a fallback.
        let strategy = Strategy::load_balance(vec![
            openai_target(&broken.uri()).with_weight(1.0).unwrap(),
            openai_target(&healthy.uri()).with_weight(0.0).unwrap(),
        ])
        .unwrap();

        let outcome = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.served_by.target_index(), Some(1));
        assert_eq!(outcome.attempts.len(), 2);
    }

    // ==================== Sticky Session Tests ====================

    #[tokio::test]
    async fn test_sticky_session_pins_to_one_target() {
        let a = openai_backend(200, openai_completion("a")).await;
        let b = openai_backend(200, openai_completion("b")).await;

        let strategy = Strategy::load_balance(vec![
            openai_target(&a.uri()).with_weight(1.0).unwrap(),
            openai_target(&b.uri()).with_weight(1.0).unwrap(),
        ])
        .unwrap()
        .with_sticky_session(
            StickySession::new(vec!["user".to_string()], Duration::from_secs(60)).unwrap(),
        );

        let dispatcher = dispatcher();
        let mut served = Vec::new();
        for _ in 0..20 {
            let mut request = chat_request("hi");
            request.user = Some("alice".to_string());
            let outcome = dispatcher
                .dispatch(&request, Some(&strategy), &DispatchOptions::default())
                .await
                .unwrap();
            served.push(outcome.served_by.target_index());
        }

        assert!(served.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(dispatcher.resolver().sticky_store().len(), 1);
    }

    #[tokio::test]
    async fn test_sticky_binding_dropped_when_pinned_target_fails() {
        let backend = openai_backend(500, json!({"error": "down"})).await;
        let strategy = Strategy::single(openai_target(&backend.uri())).with_sticky_session(
            StickySession::new(vec!["user".to_string()], Duration::from_secs(60)).unwrap(),
        );

        let dispatcher = dispatcher();
        let mut request = chat_request("hi");
        request.user = Some("bob".to_string());

        assert!(
            dispatcher
                .dispatch(&request, Some(&strategy), &DispatchOptions::default())
                .await
                .is_err()
        );
        assert!(dispatcher.resolver().sticky_store().is_empty());
    }

    // ==================== Outcome Tests ====================

    #[tokio::test]
    async fn test_served_by_names_provider() {
        let backend = openai_backend(200, openai_completion("ok")).await;
        let strategy = Strategy::single(openai_target(&backend.uri()));

        let outcome = dispatcher()
            .dispatch(&chat_request("hi"), Some(&strategy), &DispatchOptions::default())
            .await
            .unwrap();

        match &outcome.served_by {
            ServedBy::Target { index, provider, base_url } => {
                assert_eq!(*index, 0);
                assert_eq!(*provider, Provider::OpenAi);
                assert!(base_url.starts_with("http://127.0.0.1"));
            }
            ServedBy::Cache => panic!("expected an upstream target"),
        }
        assert_eq!(outcome.served_by.to_string(), "openai");
    }
}
