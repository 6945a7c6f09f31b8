//! Per-target request overrides

use crate::core::types::{ChatCompletionRequest, GenerationParams};
use serde::{Deserialize, Serialize};

/// Fields a target forces onto every request it serves.
///
/// Typically the model name, since each backend hosts its own models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub params: GenerationParams,
}

impl ParamOverrides {
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            params: GenerationParams::default(),
        }
    }

    /// Model the request resolves to after overrides
    pub fn resolve_model<'a>(&'a self, request: &'a ChatCompletionRequest) -> &'a str {
        self.model.as_deref().unwrap_or(&request.model)
    }

    /// Build the outbound request: client fields first, override fields on top.
    pub fn apply(&self, request: &ChatCompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.resolve_model(request).to_string(),
            messages: request.messages.clone(),
            params: request.params.merged_with(&self.params),
            stream: None,
            user: request.user.clone(),
            metadata: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.params.is_empty()
    }
}
