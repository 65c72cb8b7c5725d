use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::require_auth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Answer a question from indexed context. Greetings and the refusal
/// outcome are still HTTP 200 with an answer; only a backend failure
/// becomes an error status.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_auth(&headers, &state.tokens).await?;

    let question = req.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let answer = state.pipeline.answer(question).await?;

    Ok(Json(json!({
        "question": question,
        "answer": answer,
    })))
}
