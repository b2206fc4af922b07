// ABOUTME: HTTP request handlers for the access-code workflow
// ABOUTME: Public request/verify endpoints and key-protected admin approve/reject

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
    Json,
};
use bulletin_backlog::{authorize_admin, AccessRequestInput};
use bulletin_core::AccessRequest;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::access_gate::access_cookie_header;
use crate::response::{ok, ApiResponse, ApiResult, AppError};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AccessMessage {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyRequest {
    pub code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminKeyQuery {
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminDecision {
    pub id: Option<u64>,
    pub key: String,
}

impl AdminDecision {
    fn authorized_id(&self, state: &AppState) -> Result<u64, AppError> {
        authorize_admin(state.settings.admin_key.as_deref(), &self.key)?;
        self.id
            .ok_or_else(|| AppError::Validation("Invalid request id".to_string()))
    }
}

/// Submit a request for an access code
pub async fn request_access(
    State(state): State<AppState>,
    Json(input): Json<AccessRequestInput>,
) -> ApiResult<AccessMessage> {
    let request = state.store.submit_access_request(input).await?;
    info!("Access request {} recorded for {}", request.id, request.email);
    ok(AccessMessage {
        message: "Request received. A code is shared after approval.".to_string(),
    })
}

/// Exchange a valid code for the access cookie
pub async fn verify_access(
    State(state): State<AppState>,
    Json(input): Json<VerifyRequest>,
) -> Result<Response, AppError> {
    let code = state.store.verify_access_code(&input.code).await?;
    info!("Access granted to {}", code.email);

    let body = ResponseJson(ApiResponse::success(AccessMessage {
        message: "Access granted".to_string(),
    }));
    let mut response = body.into_response();
    match access_cookie_header(state.settings.cookie_secure) {
        Some(cookie) => {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        None => warn!("Failed to build access cookie header"),
    }
    Ok(response)
}

/// All access requests, newest first
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<AdminKeyQuery>,
) -> ApiResult<Vec<AccessRequest>> {
    authorize_admin(state.settings.admin_key.as_deref(), &query.key)?;
    ok(state.store.list_access_requests().await?)
}

/// Approve a request and mint its code
pub async fn approve_request(
    State(state): State<AppState>,
    Json(decision): Json<AdminDecision>,
) -> ApiResult<AccessRequest> {
    let id = decision.authorized_id(&state)?;
    info!("Approving access request: {}", id);
    ok(state.store.approve_access_request(id).await?)
}

/// Reject a request and revoke its codes
pub async fn reject_request(
    State(state): State<AppState>,
    Json(decision): Json<AdminDecision>,
) -> ApiResult<AccessRequest> {
    let id = decision.authorized_id(&state)?;
    info!("Rejecting access request: {}", id);
    ok(state.store.reject_access_request(id).await?)
}
