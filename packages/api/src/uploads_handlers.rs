// ABOUTME: Multipart upload handlers
// ABOUTME: Public file uploads and the roadmap workbook import with reseed

use axum::{
    body::Bytes,
    extract::{Multipart, State},
};
use chrono::Utc;
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::response::{ok, ApiResult, AppError};
use crate::AppState;

/// Form field carrying the uploaded file
const FILE_FIELD: &str = "file";

const DEFAULT_UPLOAD_NAME: &str = "upload.bin";

/// File pulled out of a multipart body
#[derive(Debug)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Read the `file` field from a multipart body
pub async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        return Ok(Some(UploadedFile {
            name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`
pub fn safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub name: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Store an uploaded file under the public upload directory
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let file = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let original = if file.name.is_empty() {
        DEFAULT_UPLOAD_NAME
    } else {
        file.name.as_str()
    };
    let stored = format!("{}-{}", Utc::now().timestamp_millis(), safe_file_name(original));

    let upload_dir = &state.settings.upload_dir;
    fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))?;
    fs::write(upload_dir.join(&stored), &file.bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

    info!("Stored upload {} ({} bytes)", stored, file.bytes.len());
    ok(UploadResponse {
        url: format!("/uploads/{}", stored),
        name: file.name,
        size: file.bytes.len(),
        content_type: file.content_type,
    })
}

#[derive(Debug, Serialize)]
pub struct ReseedResponse {
    pub total: usize,
}

/// Rebuild initiatives from the current workbook
pub async fn reseed(State(state): State<AppState>) -> ApiResult<ReseedResponse> {
    let db = state.store.reseed().await?;
    info!("Reseeded backlog: {} initiatives", db.initiatives.len());
    ok(ReseedResponse {
        total: db.initiatives.len(),
    })
}

/// Replace the roadmap workbook with an uploaded `.xlsx` and reseed
pub async fn import_roadmap(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<ReseedResponse> {
    let file = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("Excel file is required".to_string()))?;

    if !file.name.to_lowercase().ends_with(".xlsx") {
        return Err(AppError::Validation(
            "Only .xlsx files are supported".to_string(),
        ));
    }

    info!("Importing roadmap workbook {} ({} bytes)", file.name, file.bytes.len());
    let db = state.store.replace_source(file.bytes.to_vec()).await?;
    ok(ReseedResponse {
        total: db.initiatives.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("Road map (v2).png"), "Road_map__v2_.png");
        assert_eq!(safe_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(safe_file_name("ğüş.pdf"), "___.pdf");
    }
}
