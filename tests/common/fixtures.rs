//! Test fixtures and data factories

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use switchyard::core::cache::{MemoryCache, ResponseCache};
use switchyard::core::dispatcher::Dispatcher;
use switchyard::core::router::StrategyResolver;
use switchyard::core::target::{Provider, Target};
use switchyard::core::types::{ChatCompletionRequest, ChatMessage};
use switchyard::core::upstream::{UpstreamClient, UpstreamSettings};

/// A one-message chat request
pub fn chat_request(prompt: &str) -> ChatCompletionRequest {
    ChatCompletionRequest::new("test-model", vec![ChatMessage::user(prompt)])
}

/// OpenAI-style completion body answering `text`
pub fn openai_completion(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
    })
}

/// Ollama `/api/chat` body answering `text`
pub fn ollama_completion(text: &str) -> Value {
    json!({
        "model": "llama3",
        "created_at": "2024-05-01T12:00:00Z",
        "message": {"role": "assistant", "content": text},
        "done": true,
        "done_reason": "stop",
        "prompt_eval_count": 5,
        "eval_count": 2
    })
}

/// OpenAI-dialect target at `base_url`
pub fn openai_target(base_url: &str) -> Target {
    Target::new(Provider::OpenAi, base_url).expect("valid target url")
}

/// Ollama target at `base_url`
pub fn ollama_target(base_url: &str) -> Target {
    Target::new(Provider::Ollama, base_url).expect("valid target url")
}

/// A target nothing listens on
pub fn dead_target() -> Target {
    openai_target("http://127.0.0.1:1")
}

pub fn settings(attempt_timeout: Duration) -> UpstreamSettings {
    UpstreamSettings {
        attempt_timeout,
        ..UpstreamSettings::default()
    }
}

/// Dispatcher without a cache
pub fn dispatcher() -> Dispatcher {
    dispatcher_with(settings(Duration::from_secs(5)))
}

pub fn dispatcher_with(settings: UpstreamSettings) -> Dispatcher {
    let upstream = UpstreamClient::new(settings).expect("http client");
    Dispatcher::new(Arc::new(upstream), StrategyResolver::default())
}

/// Dispatcher over an in-memory cache that caches every strategy
pub fn cached_dispatcher() -> Dispatcher {
    let cache = ResponseCache::new(
        Arc::new(MemoryCache::new(1_000)),
        "test_cache",
        Duration::from_secs(60),
    );
    dispatcher().with_cache(cache)
}
