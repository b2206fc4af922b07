// ABOUTME: Postgres backend storing the backlog document as one JSONB row
// ABOUTME: Same single-row backlog_state layout as the SQLite backend

use async_trait::async_trait;
use bulletin_core::BacklogDatabase;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::{DocumentBackend, StorageResult, DOCUMENT_ROW_ID};

/// Backlog document stored in a Postgres `backlog_state` table
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Connect to a `postgres://` URL. TLS settings come from the URL (`sslmode`).
    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!("Connected to Postgres backlog store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentBackend for PostgresBackend {
    async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS backlog_state (
                id INTEGER PRIMARY KEY,
                payload JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self) -> StorageResult<Option<BacklogDatabase>> {
        let row = sqlx::query("SELECT payload::text AS payload FROM backlog_state WHERE id = $1 LIMIT 1")
            .bind(DOCUMENT_ROW_ID as i32)
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
            VALUES ($1, $2::jsonb, NOW())
            ON CONFLICT (id)
            DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()
            "#,
        )
        .bind(DOCUMENT_ROW_ID as i32)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn is_relational(&self) -> bool {
        true
    }
}
