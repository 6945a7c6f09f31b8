//! Backend wire dialects

use super::TargetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol dialect spoken by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Provider {
    /// OpenAI-compatible `/v1/chat/completions` (OpenAI, vLLM, llama.cpp server)
    OpenAi,
    /// Ollama native `/api/chat`
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
        }
    }

    /// Base URL used when a target names no host
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Ollama => "http://localhost:11434",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "vllm" | "openai-compatible" => Ok(Provider::OpenAi),
            "ollama" => Ok(Provider::Ollama),
            other => Err(TargetError::UnknownProvider(other.to_string())),
        }
    }
}

impl TryFrom<String> for Provider {
    type Error = TargetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        provider.as_str().to_string()
    }
}
