//! Deterministic request fingerprints

use super::CacheError;
use crate::core::router::Strategy;
use crate::core::types::ChatCompletionRequest;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::fmt;

/// Namespaced SHA-256 digest of everything that affects model output.
///
/// Covers the targets' identities and resolved models, the ordered messages
/// and the generation parameters each target is sent. `user`, `metadata` and `stream` are not
/// part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    key: String,
    digest_start: usize,
}

impl Fingerprint {
    pub fn compute(
        namespace: &str,
        strategy: &Strategy,
        request: &ChatCompletionRequest,
    ) -> Result<Self, CacheError> {
        let targets = strategy.targets();
        let providers: Vec<String> = targets
            .iter()
            .map(|t| format!("{}@{}", t.provider(), t.endpoint_key()))
            .collect();
        let models: Vec<&str> = targets.iter().map(|t| t.resolved_model(request)).collect();

        // Parameters as each target will receive them, overrides applied.
        let params = targets
            .iter()
            .map(|t| serde_json::to_value(request.params.merged_with(&t.overrides().params)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        let messages = serde_json::to_value(&request.messages)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let input = json!({
            "provider": providers.join(","),
            "model": models.join(","),
            "messages": messages,
            "params": params,
        });

        let mut canonical = String::new();
        write_canonical(&input, &mut canonical);

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hex::encode(hasher.finalize());

        Ok(Self::from_digest(namespace, &digest))
    }

    fn from_digest(namespace: &str, digest: &str) -> Self {
        if namespace.is_empty() {
            Self {
                key: digest.to_string(),
                digest_start: 0,
            }
        } else {
            Self {
                key: format!("{}:{}", namespace, digest),
                digest_start: namespace.len() + 1,
            }
        }
    }

    /// Full cache key, namespace included
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Hex digest without the namespace
    pub fn digest(&self) -> &str {
        &self.key[self.digest_start..]
    }

    /// Short digest prefix for log lines
    pub fn short(&self) -> &str {
        let digest = self.digest();
        &digest[..12.min(digest.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Serialize with object keys sorted at every depth.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
