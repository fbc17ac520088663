use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{error, info, instrument};

use scholia_core::api_types::{AnalysisResponse, UploadParams};

use super::{error_response, scholia_error_response};
use crate::pipeline::analyze_upload;
use crate::state::AppState;

#[instrument(skip(state, body), fields(filename = %params.filename, bytes = body.len()))]
pub async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> impl IntoResponse {
    let filename = params.filename.trim();
    if filename.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "filename must not be empty");
    }

    let doc_id = uuid::Uuid::new_v4().to_string();
    info!(%doc_id, "Document uploaded, starting analysis");

    match analyze_upload(&state, &doc_id, filename, &body).await {
        Ok((document, parsed_data)) => {
            let response = AnalysisResponse {
                message: "Document analysis completed".to_string(),
                document,
                parsed_data,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(%doc_id, error = %e, "Document analysis failed");
            scholia_error_response(&e)
        }
    }
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!(%id, "Fetching document record");

    match state.records.require(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => scholia_error_response(&e),
    }
}
