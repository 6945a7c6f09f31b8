//! Cache administration endpoint

use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ClearResponse {
    cleared: u64,
}

/// `DELETE /v1/cache`: drop every cached response in the namespace
pub async fn clear_cache(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let cleared = state.gateway.clear_cache().await?;
    Ok(HttpResponse::Ok().json(ClearResponse { cleared }))
}
