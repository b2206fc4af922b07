// ABOUTME: Local JSON file backend for the backlog document
// ABOUTME: Pretty-printed document written through a temp file and rename

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bulletin_core::BacklogDatabase;
use tokio::fs;
use tracing::{debug, warn};

use crate::{DocumentBackend, StorageResult};

/// Backlog document stored as a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DocumentBackend for JsonFileBackend {
    async fn initialize(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn load(&self) -> StorageResult<Option<BacklogDatabase>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No backlog document at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<BacklogDatabase>(&content) {
            Ok(db) => {
                debug!(
                    initiatives = db.initiatives.len(),
                    ideas = db.ideas.len(),
                    "Loaded backlog document from {:?}",
                    self.path
                );
                Ok(Some(db))
            }
            Err(e) => {
                warn!("Failed to parse backlog document {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    async fn save(&self, db: &BacklogDatabase) -> StorageResult<()> {
        self.initialize().await?;

        let json_content = serde_json::to_string_pretty(db)?;
        let temp = self.temp_path();
        fs::write(&temp, json_content).await?;
        fs::rename(&temp, &self.path).await?;

        debug!(
            initiatives = db.initiatives.len(),
            "Wrote backlog document to {:?}",
            self.path
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulletin_core::IdeaRecord;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(temp.path().join("data").join("backlog-db.json"));

        assert!(backend.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data").join("backlog-db.json");
        let backend = JsonFileBackend::new(&path);

        let db = BacklogDatabase {
            ideas: vec![IdeaRecord {
                id: 1,
                title: "Dark mode".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        backend.save(&db).await.unwrap();

        assert!(path.exists());
        assert!(!backend.temp_path().exists());
        assert_eq!(backend.load().await.unwrap(), Some(db));
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("backlog-db.json");
        std::fs::write(&path, "{ not json").unwrap();

        let backend = JsonFileBackend::new(&path);
        assert!(backend.load().await.unwrap().is_none());
    }
}
