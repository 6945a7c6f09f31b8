//! Wire dialect translation
//!
//! OpenAI-compatible backends take and return the gateway's own shapes.
//! Ollama's native `/api/chat` nests sampling parameters under `options` and
//! returns a single message with its own usage counters.

use super::error::AttemptError;
use crate::core::target::Provider;
use crate::core::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, MessageRole, Usage,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Ollama request fields that live at the top level rather than in `options`
const OLLAMA_TOP_LEVEL: &[&str] = &["format", "keep_alive", "tools", "think"];

/// Encode an outbound request body for `provider`.
pub fn encode_request(provider: Provider, request: &ChatCompletionRequest) -> Result<Value, AttemptError> {
    match provider {
        Provider::OpenAi => serde_json::to_value(request)
            .map_err(|e| AttemptError::Encoding(e.to_string())),
        Provider::Ollama => Ok(encode_ollama(request)),
    }
}

fn encode_ollama(request: &ChatCompletionRequest) -> Value {
    let params = &request.params;
    let mut options = Map::new();
    let mut body = Map::new();

    if let Some(t) = params.temperature {
        options.insert("temperature".into(), json!(t));
    }
    if let Some(p) = params.top_p {
        options.insert("top_p".into(), json!(p));
    }
    if let Some(n) = params.max_tokens {
        options.insert("num_predict".into(), json!(n));
    }
    if let Some(stop) = &params.stop {
        options.insert("stop".into(), json!(stop.to_vec()));
    }
    if let Some(seed) = params.seed {
        options.insert("seed".into(), json!(seed));
    }
    if let Some(p) = params.presence_penalty {
        options.insert("presence_penalty".into(), json!(p));
    }
    if let Some(p) = params.frequency_penalty {
        options.insert("frequency_penalty".into(), json!(p));
    }
    for (key, value) in &params.extra {
        if OLLAMA_TOP_LEVEL.contains(&key.as_str()) {
            body.insert(key.clone(), value.clone());
        } else {
            options.insert(key.clone(), value.clone());
        }
    }

    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|m| json!({"role": m.role.to_string(), "content": m.text()}))
        .collect();

    body.insert("model".into(), json!(request.model));
    body.insert("messages".into(), Value::Array(messages));
    body.insert("stream".into(), json!(false));
    if !options.is_empty() {
        body.insert("options".into(), Value::Object(options));
    }
    Value::Object(body)
}

/// Decode a backend body into a chat completion.
///
/// A body without at least one choice is malformed.
pub fn decode_response(provider: Provider, body: &[u8]) -> Result<ChatCompletionResponse, AttemptError> {
    let response = match provider {
        Provider::OpenAi => serde_json::from_slice::<ChatCompletionResponse>(body)
            .map_err(|e| AttemptError::MalformedResponse(e.to_string()))?,
        Provider::Ollama => serde_json::from_slice::<OllamaChatResponse>(body)
            .map_err(|e| AttemptError::MalformedResponse(e.to_string()))?
            .into(),
    };

    if response.choices.is_empty() {
        return Err(AttemptError::MalformedResponse(
            "response has no choices".to_string(),
        ));
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    created_at: Option<String>,
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl From<OllamaChatResponse> for ChatCompletionResponse {
    fn from(raw: OllamaChatResponse) -> Self {
        let created = raw
            .created_at
            .as_deref()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.timestamp())
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let usage = match (raw.prompt_eval_count, raw.eval_count) {
            (None, None) => None,
            (prompt, completion) => Some(Usage::new(prompt.unwrap_or(0), completion.unwrap_or(0))),
        };

        ChatCompletionResponse {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
            object: "chat.completion".to_string(),
            created,
            model: raw.model,
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::new(MessageRole::Assistant, raw.message.content),
                finish_reason: Some(raw.done_reason.unwrap_or_else(|| "stop".to_string())),
            }],
            usage,
            system_fingerprint: None,
        }
    }
}
