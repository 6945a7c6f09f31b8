//! Logging configuration

use super::*;
use crate::utils::logging::LogFormat;
use serde::{Deserialize, Serialize};

/// Logging configuration; `RUST_LOG` overrides `level`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
