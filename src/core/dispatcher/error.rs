//! Dispatch errors

use super::outcome::AttemptRecord;
use thiserror::Error;

/// Terminal dispatch failures.
///
/// Individual attempt failures never surface on their own; they are carried
/// here for diagnostics once nothing is left to try.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    /// Every candidate failed
    #[error("all providers exhausted after {} attempt(s){}", .attempts.len(), last_error(.attempts))]
    AllProvidersExhausted { attempts: Vec<AttemptRecord> },

    /// The client went away before a response was produced
    #[error("request cancelled after {} attempt(s)", .attempts.len())]
    Cancelled { attempts: Vec<AttemptRecord> },

    /// Nothing to route with
    #[error("no routing strategy: send x-gateway-config or x-gateway-provider, or configure routing")]
    NoStrategy,
}

impl DispatchError {
    /// Attempts made before the failure, in order
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            DispatchError::AllProvidersExhausted { attempts } | DispatchError::Cancelled { attempts } => {
                attempts
            }
            DispatchError::NoStrategy => &[],
        }
    }
}

fn last_error(attempts: &[AttemptRecord]) -> String {
    match attempts.last() {
        Some(AttemptRecord {
            target_index,
            provider,
            error: Some(error),
            ..
        }) => format!("; last error from target {} ({}): {}", target_index, provider, error),
        _ => String::new(),
    }
}
