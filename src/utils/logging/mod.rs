//! Logging initialisation
//!
//! The gateway logs through `tracing` everywhere; this module installs the
//! global subscriber once at startup.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable single-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Build the env filter: `RUST_LOG` wins, otherwise the configured level.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber. Subsequent calls are no-ops.
pub fn init_logging(format: LogFormat, default_level: &str) {
    let filter = build_filter(default_level);
    INIT.call_once(move || {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false);

        let result = match format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Json => builder.json().with_current_span(false).try_init(),
        };

        if let Err(e) = result {
            eprintln!("Failed to install log subscriber: {}", e);
        }
    });
}
