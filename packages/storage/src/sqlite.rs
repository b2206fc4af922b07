// ABOUTME: SQLite backend storing the backlog document as one JSON row
// ABOUTME: Uses a single-row backlog_state table keyed by id 1

use std::str::FromStr;

use async_trait::async_trait;
use bulletin_core::BacklogDatabase;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::{DocumentBackend, StorageError, StorageResult, DOCUMENT_ROW_ID};

/// Backlog document stored in a SQLite `backlog_state` table
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Connect to a `sqlite:` URL, creating the database file if needed
    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::InvalidConfiguration(e.to_string()))?
            .create_if_missing(true);

        // Every connection to an in-memory database is a separate database
        let in_memory = url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        info!("Connected to SQLite backlog store at {}", url);
        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentBackend for SqliteBackend {
    async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS backlog_state (
                id INTEGER PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self) -> StorageResult<Option<BacklogDatabase>> {
        let row = sqlx::query("SELECT payload FROM backlog_state WHERE id = ? LIMIT 1")
            .bind(DOCUMENT_ROW_ID)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload")?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => {
                debug!("backlog_state has no document row yet");
                Ok(None)
            }
        }
    }

    async fn save(&self, db: &BacklogDatabase) -> StorageResult<()> {
        let payload = serde_json::to_string(db)?;
        sqlx::query(
            r#"
            INSERT INTO backlog_state (id, payload, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (id)
            DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
            "#,
        )
        .bind(DOCUMENT_ROW_ID)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn is_relational(&self) -> bool {
        true
    }
}
