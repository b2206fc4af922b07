// ABOUTME: Backlog store over a whole-document backend
// ABOUTME: Lazy bootstrap from the roadmap workbook, serialized updates, reseed and source replacement

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bulletin_core::{backlog_file, roadmap_workbook, BacklogDatabase};
use bulletin_ingest::{seed_document, DetailRichnessEstimator, ProgressEstimator};
use bulletin_storage::{
    DocumentBackend, JsonFileBackend, StorageConfig, StorageFactory, StorageProvider, WriteQueue,
};
use chrono::{Local, Utc};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{BacklogError, BacklogResult};

/// The single source of truth for initiatives, ideas, and access data.
///
/// Reads go straight to the backend. Every write (including the first-read
/// bootstrap) goes through one `WriteQueue`, so concurrent updates apply in
/// submission order and never lose each other's changes. Clones share the
/// same backend and queue.
#[derive(Clone)]
pub struct BacklogStore {
    backend: Arc<dyn DocumentBackend>,
    legacy_file: Option<JsonFileBackend>,
    source: PathBuf,
    estimator: Arc<dyn ProgressEstimator>,
    queue: WriteQueue,
}

impl BacklogStore {
    /// Create a store over `backend`, seeding from the workbook at `source`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(backend: Arc<dyn DocumentBackend>, source: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            legacy_file: None,
            source: source.into(),
            estimator: Arc::new(DetailRichnessEstimator),
            queue: WriteQueue::new(),
        }
    }

    /// Open the store for a content directory.
    ///
    /// With a database URL the document lives in that database and the local
    /// JSON file is only consulted as a one-time migration source.
    pub async fn open(content_dir: &Path, database_url: Option<&str>) -> BacklogResult<Self> {
        let json_path = backlog_file(content_dir);
        let provider = StorageProvider::from_database_url(database_url, json_path.clone())?;
        let backend = StorageFactory::create_backend(&StorageConfig::new(provider)).await?;

        let mut store = Self::new(backend.clone(), roadmap_workbook(content_dir));
        if backend.is_relational() {
            store = store.with_legacy_file(json_path);
        }
        Ok(store)
    }

    /// Local JSON document copied into an empty relational backend on first read
    pub fn with_legacy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.legacy_file = Some(JsonFileBackend::new(path));
        self
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn ProgressEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Path of the roadmap workbook used for seeding
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Return the persisted document, bootstrapping it on first use
    pub async fn read(&self) -> BacklogResult<BacklogDatabase> {
        if let Some(db) = self.backend.load().await? {
            return Ok(db);
        }

        let store = self.clone();
        self.queue
            .run(move || async move { store.load_or_bootstrap().await })
            .await
    }

    /// Apply `mutator` to the latest document and persist the result.
    ///
    /// When the mutator fails nothing is written.
    pub async fn mutate<T, F>(&self, mutator: F) -> BacklogResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut BacklogDatabase) -> BacklogResult<T> + Send + 'static,
    {
        let store = self.clone();
        self.queue
            .run(move || async move {
                let mut db = store.load_or_bootstrap().await?;
                let value = mutator(&mut db)?;
                store.backend.save(&db).await?;
                Ok(value)
            })
            .await
    }

    /// Replace the document with `mutator(current)` and return the new document
    pub async fn update<F>(&self, mutator: F) -> BacklogResult<BacklogDatabase>
    where
        F: FnOnce(BacklogDatabase) -> BacklogDatabase + Send + 'static,
    {
        self.mutate(move |db| {
            *db = mutator(std::mem::take(db));
            Ok(db.clone())
        })
        .await
    }

    /// Re-run ingestion against the current workbook and persist the result
    pub async fn reseed(&self) -> BacklogResult<BacklogDatabase> {
        let store = self.clone();
        self.queue
            .run(move || async move { store.reseed_now().await })
            .await
    }

    /// Overwrite the workbook with `bytes`, then reseed from it
    pub async fn replace_source(&self, bytes: Vec<u8>) -> BacklogResult<BacklogDatabase> {
        let store = self.clone();
        self.queue
            .run(move || async move {
                if let Some(parent) = store.source.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(&store.source, &bytes).await?;
                info!(bytes = bytes.len(), "Replaced roadmap workbook {:?}", store.source);
                store.reseed_now().await
            })
            .await
    }

    // Everything below runs inside a queue job.

    async fn load_or_bootstrap(&self) -> BacklogResult<BacklogDatabase> {
        if let Some(db) = self.backend.load().await? {
            return Ok(db);
        }

        if let Some(legacy) = &self.legacy_file {
            if let Some(local) = legacy.load().await? {
                warn!(
                    "Migrating local backlog document {:?} into the {} backend",
                    legacy.path(),
                    self.backend.name()
                );
                self.backend.save(&local).await?;
                return Ok(local);
            }
        }

        info!("No backlog document yet, seeding from {:?}", self.source);
        let seeded = self.seed(None).await?;
        self.backend.save(&seeded).await?;
        Ok(seeded)
    }

    async fn reseed_now(&self) -> BacklogResult<BacklogDatabase> {
        let existing = match self.backend.load().await? {
            Some(db) => Some(db),
            None => match &self.legacy_file {
                Some(legacy) => legacy.load().await?,
                None => None,
            },
        };

        let seeded = self.seed(existing).await?;
        self.backend.save(&seeded).await?;
        info!(
            initiatives = seeded.initiatives.len(),
            "Reseeded backlog from {:?}",
            self.source
        );
        Ok(seeded)
    }

    async fn seed(&self, existing: Option<BacklogDatabase>) -> BacklogResult<BacklogDatabase> {
        let source = self.source.clone();
        let estimator = self.estimator.clone();
        debug!("Decoding roadmap workbook on the blocking pool");

        tokio::task::spawn_blocking(move || {
            let now = Utc::now();
            seed_document(
                &source,
                existing,
                estimator.as_ref(),
                Local::now().date_naive(),
                now,
            )
        })
        .await
        .map_err(|e| BacklogError::Task(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulletin_core::IdeaRecord;
    use bulletin_storage::SqliteBackend;
    use tempfile::TempDir;

    fn json_store(temp: &TempDir) -> BacklogStore {
        let backend = Arc::new(JsonFileBackend::new(temp.path().join("backlog-db.json")));
        BacklogStore::new(backend, temp.path().join("roadmap.xlsx"))
    }

    #[tokio::test]
    async fn test_first_read_bootstraps_and_persists() {
        let temp = TempDir::new().unwrap();
        let store = json_store(&temp);

        let db = store.read().await.unwrap();

        assert!(db.initiatives.is_empty());
        assert_eq!(db.ideas.len(), 1);
        assert!(temp.path().join("backlog-db.json").exists());
    }

    #[tokio::test]
    async fn test_failed_mutation_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let store = json_store(&temp);
        store.read().await.unwrap();

        let result: BacklogResult<()> = store
            .mutate(|db| {
                db.ideas.clear();
                Err(BacklogError::Validation("nope".to_string()))
            })
            .await;

        assert!(matches!(result, Err(BacklogError::Validation(_))));
        assert_eq!(store.read().await.unwrap().ideas.len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_document() {
        let temp = TempDir::new().unwrap();
        let store = json_store(&temp);

        let next = store
            .update(|mut db| {
                db.ideas.push(IdeaRecord {
                    id: 2,
                    title: "Dark mode".to_string(),
                    ..Default::default()
                });
                db
            })
            .await
            .unwrap();

        assert_eq!(next.ideas.len(), 2);
        assert_eq!(store.read().await.unwrap(), next);
    }

    #[tokio::test]
    async fn test_relational_backend_migrates_local_file() {
        let temp = TempDir::new().unwrap();
        let local_path = temp.path().join("backlog-db.json");
        let local = BacklogDatabase {
            ideas: vec![IdeaRecord {
                id: 4,
                title: "Keep me".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        JsonFileBackend::new(&local_path).save(&local).await.unwrap();

        let sqlite = SqliteBackend::connect("sqlite::memory:", 1).await.unwrap();
        sqlite.initialize().await.unwrap();
        let backend: Arc<dyn DocumentBackend> = Arc::new(sqlite);
        let store = BacklogStore::new(backend.clone(), temp.path().join("roadmap.xlsx"))
            .with_legacy_file(&local_path);

        let db = store.read().await.unwrap();

        assert_eq!(db, local);
        assert_eq!(backend.load().await.unwrap(), Some(local));
    }

    #[tokio::test]
    async fn test_open_with_json_backend() {
        let temp = TempDir::new().unwrap();
        let store = BacklogStore::open(temp.path(), None).await.unwrap();

        assert_eq!(store.backend_name(), "json");
        assert_eq!(store.source(), temp.path().join("roadmap").join("roadmap.xlsx"));
    }

    #[tokio::test]
    async fn test_reseed_keeps_ideas() {
        let temp = TempDir::new().unwrap();
        let store = json_store(&temp);
        store
            .update(|mut db| {
                db.ideas[0].votes = 11;
                db
            })
            .await
            .unwrap();

        let reseeded = store.reseed().await.unwrap();

        assert_eq!(reseeded.ideas[0].votes, 11);
    }
}
