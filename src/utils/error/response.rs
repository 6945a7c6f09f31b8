//! HTTP response handling for errors

use super::types::GatewayError;
use crate::core::dispatcher::{AttemptRecord, DispatchError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

/// Non-standard status nginx popularised for "client closed request".
const CLIENT_CLOSED_REQUEST: u16 = 499;

impl GatewayError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            GatewayError::Strategy(_) => (StatusCode::BAD_REQUEST, "INVALID_STRATEGY"),
            GatewayError::Dispatch(DispatchError::AllProvidersExhausted { .. }) => {
                (StatusCode::BAD_GATEWAY, "ALL_PROVIDERS_EXHAUSTED")
            }
            GatewayError::Dispatch(DispatchError::Cancelled { .. }) => (
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                    .unwrap_or(StatusCode::SERVICE_UNAVAILABLE),
                "REQUEST_CANCELLED",
            ),
            GatewayError::Dispatch(DispatchError::NoStrategy) => {
                (StatusCode::BAD_REQUEST, "NO_STRATEGY")
            }
            GatewayError::Cache(_) => (StatusCode::SERVICE_UNAVAILABLE, "CACHE_UNAVAILABLE"),
            GatewayError::Serialization(_) | GatewayError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            GatewayError::HttpClient(_)
            | GatewayError::Yaml(_)
            | GatewayError::Io(_)
            | GatewayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn public_message(&self) -> String {
        match self {
            GatewayError::HttpClient(_) | GatewayError::Io(_) | GatewayError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Build the JSON error response, tagging it with the request id when known.
    pub fn to_response(&self, request_id: Option<&str>) -> HttpResponse {
        let (status_code, error_code) = self.status_and_code();

        let attempts = match self {
            GatewayError::Dispatch(err) if !err.attempts().is_empty() => {
                Some(err.attempts().iter().map(AttemptSummary::from).collect())
            }
            _ => None,
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message: self.public_message(),
                timestamp: crate::utils::current_timestamp(),
                request_id: request_id.map(str::to_string),
                attempts,
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response(None)
    }
}

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    pub request_id: Option<String>,
    /// Per-candidate detail for dispatch failures, in attempt order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<Vec<AttemptSummary>>,
}

/// Diagnostic view of one upstream attempt
#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    pub target_index: usize,
    pub provider: String,
    pub base_url: String,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&AttemptRecord> for AttemptSummary {
    fn from(record: &AttemptRecord) -> Self {
        Self {
            target_index: record.target_index,
            provider: record.provider.to_string(),
            base_url: record.base_url.clone(),
            latency_ms: record.latency.as_millis() as u64,
            error: record.error.as_ref().map(ToString::to_string),
        }
    }
}
