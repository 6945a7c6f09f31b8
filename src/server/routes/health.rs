//! Health check endpoint

use crate::core::HealthStatus;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

#[derive(Debug, Serialize)]
struct HealthResponse {
    #[serde(flatten)]
    health: HealthStatus,
    version: Cow<'static, str>,
    build_time: Cow<'static, str>,
    git_hash: Cow<'static, str>,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// Basic health check endpoint
///
/// Always 200 while the process serves requests; a failing cache shows up
/// as `"status": "degraded"`.
pub async fn health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    let response = HealthResponse {
        health: state.gateway.health().await,
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
        build_time: Cow::Borrowed(env!("BUILD_TIME")),
        git_hash: Cow::Borrowed(env!("GIT_HASH")),
        timestamp: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok().json(response))
}
