use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument};

use scholia_core::api_types::CitationRequest;

use super::error_response;
use crate::state::AppState;

#[instrument(skip(state, req), fields(title = %req.title))]
pub async fn resolve_citations(
    State(state): State<AppState>,
    Json(req): Json<CitationRequest>,
) -> impl IntoResponse {
    if req.title.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "title must not be empty");
    }

    let result = state.citations.resolve(&req.title).await;
    info!(found = !result.is_not_found(), "Citation lookup finished");
    (StatusCode::OK, Json(result)).into_response()
}
