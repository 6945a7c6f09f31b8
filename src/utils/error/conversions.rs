//! Type conversions for GatewayError

use super::types::GatewayError;
use actix_web::error::JsonPayloadError;

impl From<JsonPayloadError> for GatewayError {
    fn from(err: JsonPayloadError) -> Self {
        GatewayError::BadRequest(format!("Invalid request body: {}", err))
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        GatewayError::Config(format!("Invalid URL: {}", err))
    }
}
