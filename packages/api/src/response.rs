// ABOUTME: Shared API response types and error handling
// ABOUTME: Provides the success/data/error envelope and maps domain errors to status codes

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use bulletin_ai::AIServiceError;
use bulletin_backlog::BacklogError;
use bulletin_content::ContentError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Handler result carrying the envelope on success
pub type ApiResult<T> = Result<ResponseJson<ApiResponse<T>>, AppError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(ResponseJson(ApiResponse::success(data)))
}

/// Errors a handler can return
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BacklogError> for AppError {
    fn from(err: BacklogError) -> Self {
        match err {
            BacklogError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            BacklogError::Validation(message) => AppError::Validation(message),
            BacklogError::Unauthorized(message) => AppError::Unauthorized(message),
            other => {
                error!("Backlog operation failed: {}", other);
                AppError::Internal("Storage error".to_string())
            }
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(slug) => AppError::NotFound(format!("Sprint {} not found", slug)),
            other => {
                error!("Failed to load sprint content: {}", other);
                AppError::Internal("Content error".to_string())
            }
        }
    }
}

impl From<AIServiceError> for AppError {
    fn from(err: AIServiceError) -> Self {
        match err {
            AIServiceError::EmptyQuestion => AppError::Validation(err.to_string()),
            other => {
                error!("Chat assistant failed: {}", other);
                AppError::Internal("Assistant error".to_string())
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Validation(format!("Invalid upload: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, ResponseJson(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
