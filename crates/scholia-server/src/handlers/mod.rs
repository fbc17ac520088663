pub mod chat;
pub mod citations;
pub mod documents;
pub mod health;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};

use scholia_core::error::ScholiaError;

/// JSON `{"error": ...}` body with the given status.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Maps a domain error onto its HTTP status.
pub(crate) fn status_for(error: &ScholiaError) -> StatusCode {
    match error {
        ScholiaError::NotFound(_) => StatusCode::NOT_FOUND,
        ScholiaError::ToolInput { .. } | ScholiaError::Parse(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn scholia_error_response(error: &ScholiaError) -> Response {
    error_response(status_for(error), error.to_string())
}
