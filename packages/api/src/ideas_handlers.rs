// ABOUTME: HTTP request handlers for ideas and votes
// ABOUTME: Ranked listing, create, patch, delete, and delta votes

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    Json,
};
use bulletin_backlog::{IdeaPatch, NewIdea};
use bulletin_core::IdeaRecord;
use serde::Deserialize;
use tracing::info;

use crate::initiatives_handlers::DeletedResponse;
use crate::response::{ok, ApiResponse, ApiResult, AppError};
use crate::AppState;

/// Vote body; a missing body or delta counts as one up-vote
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VoteRequest {
    pub delta: Option<i64>,
}

pub async fn list_ideas(State(state): State<AppState>) -> ApiResult<Vec<IdeaRecord>> {
    ok(state.store.list_ideas().await?)
}

pub async fn create_idea(
    State(state): State<AppState>,
    Json(input): Json<NewIdea>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<IdeaRecord>>), AppError> {
    info!("Creating idea: {:?}", input.title);
    let created = state.store.create_idea(input).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(created))))
}

pub async fn patch_idea(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<IdeaPatch>,
) -> ApiResult<IdeaRecord> {
    info!("Updating idea: {}", id);
    ok(state.store.patch_idea(id, patch).await?)
}

pub async fn delete_idea(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<DeletedResponse> {
    info!("Deleting idea: {}", id);
    let remaining = state.store.delete_idea(id).await?;
    ok(DeletedResponse { id, remaining })
}

/// Vote on an idea; votes never drop below zero
pub async fn vote_idea(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: Bytes,
) -> ApiResult<IdeaRecord> {
    let vote: VoteRequest = if body.iter().all(u8::is_ascii_whitespace) {
        VoteRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid vote: {}", e)))?
    };
    let delta = vote.delta.unwrap_or(1);
    info!("Voting on idea {}: {:+}", id, delta);
    ok(state.store.vote_idea(id, delta).await?)
}
