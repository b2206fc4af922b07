// ABOUTME: HTTP request handlers for sprint bulletins, chat, and health
// ABOUTME: Read-only sprint content and the backlog question answerer

use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    Json,
};
use bulletin_ai::ChatAnswer;
use bulletin_content::Sprint;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::response::{ok, ApiResult, AppError};
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> ResponseJson<Value> {
    ResponseJson(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "bulletin",
        "storage": state.store.backend_name(),
        "assistant": state.assistant.provider_name(),
    }))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}

pub async fn list_sprints(State(state): State<AppState>) -> ApiResult<Vec<Sprint>> {
    ok(state.sprints.list().await?)
}

pub async fn get_sprint(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Sprint> {
    ok(state.sprints.get(&slug).await?)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub question: String,
}

/// Answer a question about the backlog
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatAnswer> {
    let initiatives = state.store.read().await?.initiatives;
    let answer = state.assistant.ask(&request.question, &initiatives).await?;
    info!("Answered chat question in {} mode", answer.mode);
    ok(answer)
}
