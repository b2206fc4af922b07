use bulletin_storage::StorageError;
use thiserror::Error;

/// Backlog operation errors
#[derive(Error, Debug)]
pub enum BacklogError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Background task failed: {0}")]
    Task(String),
}

impl BacklogError {
    pub fn not_found(what: impl std::fmt::Display, id: u64) -> Self {
        BacklogError::NotFound(format!("{} {}", what, id))
    }
}

pub type BacklogResult<T> = Result<T, BacklogError>;
