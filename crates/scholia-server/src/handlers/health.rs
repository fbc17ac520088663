use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use scholia_core::api_types::HealthResponse;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let document_count = state.records.len().await;
    info!(document_count, "Health check requested");

    let response = HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        parser_strategy: state.parser.strategy().to_string(),
        chat_model: state.model.name().to_string(),
        embedding_model: state.embedder.model().to_string(),
        document_count,
    };

    (StatusCode::OK, Json(response))
}
