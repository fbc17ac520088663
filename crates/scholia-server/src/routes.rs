use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_check))
        // Documents
        .route(
            "/api/documents",
            post(handlers::documents::upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/documents/{id}", get(handlers::documents::get_document))
        // Chat
        .route(
            "/api/documents/{id}/chat",
            post(handlers::chat::ask_question).get(handlers::chat::chat_history),
        )
        // Citations
        .route("/api/citations", post(handlers::citations::resolve_citations))
}
