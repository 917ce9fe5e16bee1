//! SQLite-backed artifact store using sqlx.

use {
    sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions},
    tracing::debug,
};

use ladder_common::{Error, Result, now_ms};

use crate::store::{Artifact, ArtifactStore};

/// SQLite persistence for triangle artifacts.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect a fresh pool and create the schema.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(Error::store)?;
        init_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Use an existing pool; the schema must already exist (see
    /// [`init_schema`]).
    #[must_use]
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Create the artifact table. Idempotent; call once at startup.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS triangle (
            name       TEXT PRIMARY KEY,
            payload    TEXT NOT NULL,
            created_ms INTEGER NOT NULL,
            edited_ms  INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(Error::store)?;
    Ok(())
}

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Artifact {
    Artifact {
        name: row.get("name"),
        payload: row.get("payload"),
        created_ms: row.get("created_ms"),
        edited_ms: row.get("edited_ms"),
    }
}

#[async_trait::async_trait]
impl ArtifactStore for SqliteStore {
    async fn get(&self, name: &str) -> Result<Option<Artifact>> {
        let row = sqlx::query("SELECT name, payload, created_ms, edited_ms FROM triangle WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::store)?;
        Ok(row.as_ref().map(from_row))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Artifact>> {
        let rows = sqlx::query(
            "SELECT name, payload, created_ms, edited_ms FROM triangle
             ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(rows.iter().map(from_row).collect())
    }

    async fn upsert(&self, name: &str, payload: &str) -> Result<Artifact> {
        let now = now_ms();
        let row = sqlx::query(
            "INSERT INTO triangle (name, payload, created_ms, edited_ms) VALUES (?, ?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET payload = excluded.payload, edited_ms = excluded.edited_ms
             RETURNING name, payload, created_ms, edited_ms",
        )
        .bind(name)
        .bind(payload)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::store)?;
        debug!(name, "artifact upserted");
        Ok(from_row(&row))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM triangle WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(Error::store)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found(name));
        }
        debug!(name, "artifact deleted");
        Ok(())
    }

    async fn rename(&self, old: &str, new: &str) -> Result<Artifact> {
        let source = self
            .get(old)
            .await?
            .ok_or_else(|| Error::not_found(old))?;
        self.upsert(new, &source.payload).await
    }
}
