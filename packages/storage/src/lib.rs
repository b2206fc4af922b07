// ABOUTME: Persistence layer for the backlog document
// ABOUTME: Whole-document backends (JSON file, SQLite, Postgres) and the serialized write queue

use async_trait::async_trait;
use bulletin_core::BacklogDatabase;
use thiserror::Error;

pub mod factory;
pub mod json_file;
pub mod postgres;
pub mod queue;
pub mod sqlite;

// Re-export main types
pub use factory::{StorageConfig, StorageFactory, StorageProvider};
pub use json_file::JsonFileBackend;
pub use postgres::PostgresBackend;
pub use queue::WriteQueue;
pub use sqlite::SqliteBackend;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Write queue is closed")]
    QueueClosed,
    #[error("Write job panicked")]
    JobPanicked,
    #[error("Invalid storage configuration: {0}")]
    InvalidConfiguration(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Row id of the single document row in relational backends
pub const DOCUMENT_ROW_ID: i64 = 1;

/// A place the whole backlog document can be loaded from and saved to.
///
/// Every save replaces the entire document.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Prepare the backend (create tables or directories)
    async fn initialize(&self) -> StorageResult<()>;

    /// Load the persisted document, `None` when nothing has been stored yet
    async fn load(&self) -> StorageResult<Option<BacklogDatabase>>;

    /// Replace the persisted document
    async fn save(&self, db: &BacklogDatabase) -> StorageResult<()>;

    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Whether this backend is a database rather than a local file
    fn is_relational(&self) -> bool {
        false
    }
}
