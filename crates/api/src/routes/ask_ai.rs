//! Ask-AI routes: the natural-language question gateway and the literal
//! query endpoint, plus static helper data.

use ask_ai::{gateway, schema_info, SAMPLE_QUESTIONS};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Maximum accepted question length, in characters.
const MAX_QUESTION_LEN: usize = 1000;

#[derive(Deserialize)]
pub struct QuestionPayload {
    pub question: Option<String>,
}

/// POST /ask-ai/question — forward a question to the AI webhook and return
/// either its direct answer or the result of the SQL it generated.
pub async fn question(
    State(state): State<AppState>,
    Json(payload): Json<QuestionPayload>,
) -> Result<Json<gateway::QuestionResponse>> {
    let question = match payload.question.as_deref().filter(|q| !q.trim().is_empty()) {
        Some(q) => q,
        None => {
            return Err(ApiError::validation(
                "question",
                "The question field is required.",
            ))
        }
    };
    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(ApiError::validation(
            "question",
            "The question field must not be greater than 1000 characters.",
        ));
    }

    let response = gateway::answer_question(&state.webhook, state.db.pool(), question).await?;
    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct QueryPayload {
    pub query: Option<String>,
}

/// POST /ask-ai/execute-query — run a literal query through the safety
/// filter and executor. Filter rejections and execution failures come back
/// as 400 with the structured error; approved, successful queries as 200.
pub async fn execute_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryPayload>,
) -> Response {
    let query = payload.query.unwrap_or_default();
    let result = ask_ai::execute_query(state.db.pool(), &query).await;

    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(result)).into_response()
}

/// GET /ask-ai/samples — sample questions users can ask.
pub async fn samples() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": SAMPLE_QUESTIONS,
        "count": SAMPLE_QUESTIONS.len(),
    }))
}

/// GET /ask-ai/schema — description of the queryable table.
pub async fn schema() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": schema_info(),
    }))
}
