//! Chat completions endpoint

use crate::core::dispatcher::DispatchOptions;
use crate::core::types::ChatCompletionRequest;
use crate::server::routes::headers;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use crate::utils::generate_request_id;
use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Chat completions endpoint
///
/// OpenAI-compatible, non-streaming. The routing strategy comes from the
/// request headers or, failing that, the gateway configuration.
pub async fn chat_completions(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<ChatCompletionRequest>,
) -> HttpResponse {
    let request_id = generate_request_id();

    match handle_chat_completion(&state, &req, request.into_inner(), &request_id).await {
        Ok(response) => response,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Chat completion failed");
            let mut response = e.to_response(Some(&request_id));
            if let Ok(value) = request_id.parse() {
                response.headers_mut().insert(
                    actix_web::http::header::HeaderName::from_static(headers::REQUEST_ID),
                    value,
                );
            }
            response
        }
    }
}

async fn handle_chat_completion(
    state: &AppState,
    req: &HttpRequest,
    request: ChatCompletionRequest,
    request_id: &str,
) -> Result<HttpResponse> {
    request.validate().map_err(GatewayError::BadRequest)?;

    let strategy: Option<Arc<_>> = match headers::strategy_from_headers(req)? {
        Some(strategy) => Some(Arc::new(strategy)),
        None => state.gateway.default_strategy().cloned(),
    };

    info!(
        request_id,
        model = %request.model,
        strategy = strategy.as_ref().map(|s| s.mode_name()).unwrap_or("none"),
        "Chat completion request"
    );

    // Dropping the handler future (client disconnect) cancels the dispatch.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let options = DispatchOptions {
        cancel,
        force_refresh: headers::force_refresh(req),
    };

    let outcome = state
        .gateway
        .dispatcher()
        .dispatch(&request, strategy.as_deref(), &options)
        .await?;

    let mut builder = HttpResponse::Ok();
    headers::apply_outcome(&mut builder, &outcome, request_id);
    Ok(builder.json(&outcome.response))
}
