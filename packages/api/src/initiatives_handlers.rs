// ABOUTME: HTTP request handlers for initiative operations
// ABOUTME: Filtered listing, CRUD by id, and the roadmap board view

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    Json,
};
use bulletin_backlog::{InitiativePatch, InitiativeQuery, NewInitiative, RoadmapBoard};
use bulletin_core::InitiativeRecord;
use serde::Serialize;
use tracing::info;

use crate::response::{ok, ApiResponse, ApiResult, AppError};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub id: u64,
    pub remaining: usize,
}

/// List initiatives matching the query filters
pub async fn list_initiatives(
    State(state): State<AppState>,
    Query(query): Query<InitiativeQuery>,
) -> ApiResult<Vec<InitiativeRecord>> {
    info!("Listing initiatives: {:?}", query);
    ok(state.store.list_initiatives(&query).await?)
}

/// Get a single initiative by id
pub async fn get_initiative(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<InitiativeRecord> {
    ok(state.store.get_initiative(id).await?)
}

/// Create a new initiative
pub async fn create_initiative(
    State(state): State<AppState>,
    Json(input): Json<NewInitiative>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<InitiativeRecord>>), AppError> {
    info!("Creating initiative: {:?}", input.title);
    let created = state.store.create_initiative(input).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(created))))
}

/// Apply a partial update to an initiative
pub async fn patch_initiative(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<InitiativePatch>,
) -> ApiResult<InitiativeRecord> {
    info!("Updating initiative: {}", id);
    ok(state.store.patch_initiative(id, patch).await?)
}

/// Delete an initiative
pub async fn delete_initiative(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<DeletedResponse> {
    info!("Deleting initiative: {}", id);
    let remaining = state.store.delete_initiative(id).await?;
    ok(DeletedResponse { id, remaining })
}

/// Initiatives grouped by epic
pub async fn roadmap_board(State(state): State<AppState>) -> ApiResult<RoadmapBoard> {
    ok(state.store.roadmap_board().await?)
}
