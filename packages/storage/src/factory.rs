// ABOUTME: Storage backend selection from configuration
// ABOUTME: Maps a database URL (or its absence) onto a JSON file, SQLite, or Postgres backend

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    DocumentBackend, JsonFileBackend, PostgresBackend, SqliteBackend, StorageError, StorageResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    JsonFile { path: PathBuf },
    Sqlite { url: String },
    Postgres { url: String },
}

impl StorageProvider {
    /// Pick a provider from an optional database URL.
    ///
    /// An empty or missing URL selects the JSON file at `json_path`.
    pub fn from_database_url(url: Option<&str>, json_path: PathBuf) -> StorageResult<Self> {
        let url = url.map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Ok(StorageProvider::JsonFile { path: json_path });
        }

        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(StorageProvider::Postgres {
                url: url.to_string(),
            })
        } else if url.starts_with("sqlite:") {
            Ok(StorageProvider::Sqlite {
                url: url.to_string(),
            })
        } else {
            Err(StorageError::InvalidConfiguration(format!(
                "Unsupported database URL scheme: {}",
                url.split(':').next().unwrap_or_default()
            )))
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub max_connections: u32,
}

impl StorageConfig {
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_connections: 5,
        }
    }
}

/// Factory for creating backend instances
pub struct StorageFactory;

impl StorageFactory {
    /// Create and initialize a backend from configuration
    pub async fn create_backend(config: &StorageConfig) -> StorageResult<Arc<dyn DocumentBackend>> {
        debug!("Creating backlog storage with provider: {:?}", provider_label(&config.provider));

        let backend: Arc<dyn DocumentBackend> = match &config.provider {
            StorageProvider::JsonFile { path } => {
                info!("Using JSON file backlog store at: {:?}", path);
                Arc::new(JsonFileBackend::new(path.clone()))
            }
            StorageProvider::Sqlite { url } => {
                Arc::new(SqliteBackend::connect(url, config.max_connections).await?)
            }
            StorageProvider::Postgres { url } => {
                Arc::new(PostgresBackend::connect(url, config.max_connections).await?)
            }
        };

        backend.initialize().await?;
        Ok(backend)
    }
}

/// Provider description that never includes credentials
fn provider_label(provider: &StorageProvider) -> String {
    match provider {
        StorageProvider::JsonFile { path } => format!("json({})", path.display()),
        StorageProvider::Sqlite { url } => format!("sqlite({})", url),
        StorageProvider::Postgres { .. } => "postgres".to_string(),
    }
}
