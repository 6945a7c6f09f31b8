//! Inbound chat-completion request

use super::message::ChatMessage;
use super::params::GenerationParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Chat completion request (OpenAI compatible)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model to use; a target's override may replace it
    #[serde(default)]
    pub model: String,
    /// Ordered conversation
    pub messages: Vec<ChatMessage>,
    /// Generation parameters
    #[serde(flatten)]
    pub params: GenerationParams,
    /// Streaming flag; the gateway only serves complete responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// End-user identifier, not forwarded into the fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Free-form client metadata, not forwarded upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }

    /// Check the request is something the gateway can dispatch.
    pub fn validate(&self) -> Result<(), String> {
        if self.messages.is_empty() {
            return Err("messages must not be empty".to_string());
        }
        if self.is_streaming() {
            return Err("streaming responses are not supported".to_string());
        }
        if let Some(t) = self.params.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("temperature must be between 0 and 2, got {}", t));
            }
        }
        if let Some(p) = self.params.top_p {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("top_p must be between 0 and 1, got {}", p));
            }
        }
        Ok(())
    }

    /// Look up a field by dotted path (`user`, `metadata.session_id`).
    pub fn field(&self, path: &str) -> Option<Value> {
        let root = serde_json::to_value(self).ok()?;
        let mut current = &root;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        match current {
            Value::Null => None,
            value => Some(value.clone()),
        }
    }
}
