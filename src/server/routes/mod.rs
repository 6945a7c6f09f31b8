//! HTTP route modules

pub mod cache;
pub mod chat;
pub mod headers;
pub mod health;

use actix_web::web;

/// Register every gateway route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/v1")
                .route("/chat/completions", web::post().to(chat::chat_completions))
                .route("/cache", web::delete().to(cache::clear_cache)),
        );
}
