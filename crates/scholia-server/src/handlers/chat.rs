use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use scholia_core::api_types::{ChatHistoryResponse, ChatTurn, QuestionRequest};

use super::{error_response, scholia_error_response};
use crate::state::AppState;

#[instrument(skip(state, req), fields(question_len = req.question.len()))]
pub async fn ask_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<QuestionRequest>,
) -> impl IntoResponse {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "question must not be empty");
    }

    let record = match state.records.require(&id).await {
        Ok(record) => record,
        Err(e) => return scholia_error_response(&e),
    };

    let engine = match state.retrieval_engine() {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!(error = %e, "Cannot build retrieval engine");
            return scholia_error_response(&e);
        }
    };
    if !engine.load(&id).await {
        warn!(%id, "No vector index for document, answering without full-text search");
    }

    let response = state
        .orchestrator(engine)
        .answer(&question, &record.agent_context())
        .await;
    info!(has_diagram = response.diagram.is_some(), "Question answered");

    state
        .records
        .append_turn(
            &id,
            ChatTurn {
                question,
                response: response.clone(),
                asked_at: Utc::now(),
            },
        )
        .await;

    (StatusCode::OK, Json(response)).into_response()
}

pub async fn chat_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.records.require(&id).await {
        Ok(record) => {
            let response = ChatHistoryResponse {
                document_id: record.id,
                turns: record.chat_history,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => scholia_error_response(&e),
    }
}
