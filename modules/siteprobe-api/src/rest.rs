use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::warn;

use siteprobe_common::{ContentRecord, ProbeError, QuestionSpec};

use crate::AppState;

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    content: ContentRecord,
    #[serde(default)]
    questions: Vec<QuestionSpec>,
    #[serde(default)]
    answers: Vec<String>,
    session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ClassifySessionRequest {
    #[serde(default)]
    content: ContentRecord,
    session_id: String,
}

pub async fn api_generate_questions(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> Response {
    match state.analyzer.generate_question(&body.url).await {
        Ok(set) => Json(set).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_classify_results(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ClassifyRequest>,
) -> Response {
    if body.questions.is_empty() || body.answers.is_empty() {
        return error_response(ProbeError::InvalidRequest(
            "questions and answers are required".into(),
        ));
    }

    match state
        .analyzer
        .classify_results(&body.content, &body.questions, &body.answers, body.session_id)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_classify_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ClassifySessionRequest>,
) -> Response {
    match state
        .analyzer
        .classify_session(&body.content, &body.session_id)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

pub fn status_for(err: &ProbeError) -> StatusCode {
    match err {
        ProbeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ProbeError::Extraction(_) | ProbeError::Backend(_) => StatusCode::BAD_GATEWAY,
        ProbeError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ProbeError::UnknownSession(_) => StatusCode::NOT_FOUND,
        ProbeError::Store(_) | ProbeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ProbeError) -> Response {
    let status = status_for(&err);
    warn!(status = status.as_u16(), error = %err, "Request failed");
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}
