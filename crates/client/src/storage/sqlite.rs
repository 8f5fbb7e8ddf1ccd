//! SQLite-backed durable storage.
//!
//! The store is a synchronous facade, so this backend owns a current-thread
//! Tokio runtime and blocks on each query. Do not call it from inside another
//! async runtime.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::runtime::{Builder, Runtime};

use super::{KeyValueStorage, StorageError};

/// Durable key-value storage in a single SQLite file.
#[derive(Debug)]
pub struct SqliteStorage {
    runtime: Runtime,
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteStorage {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| StorageError::Runtime(err.to_string()))?;

        let pool = runtime
            .block_on(connect(&path))
            .map_err(StorageError::backend)?;

        tracing::debug!(path = %path.display(), "opened session storage");

        Ok(Self {
            runtime,
            pool,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn connect(path: &Path) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create storage directory at {:?}", parent))?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    // One connection: writes are serialized and readers see committed state.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open SQLite storage at {:?}", path))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key        TEXT PRIMARY KEY NOT NULL,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .context("failed to create kv_store table")?;

    Ok(pool)
}

async fn fetch(pool: &SqlitePool, key: &str) -> anyhow::Result<Option<String>> {
    let row = sqlx::query(
        r#"
        SELECT value
        FROM kv_store
        WHERE key = ?1
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .context("failed to read key from storage")?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let value: String = row.try_get("value")?;
    Ok(Some(value))
}

async fn upsert_all(pool: &SqlitePool, entries: &[(&str, &str)]) -> anyhow::Result<()> {
    let now = Utc::now().to_rfc3339();
    let mut tx = pool.begin().await.context("failed to begin write")?;

    for (key, value) in entries {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(*key)
        .bind(*value)
        .bind(now.as_str())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to upsert {key:?}"))?;
    }

    tx.commit().await.context("failed to commit write")?;
    Ok(())
}

async fn delete_all(pool: &SqlitePool, keys: &[&str]) -> anyhow::Result<()> {
    let mut tx = pool.begin().await.context("failed to begin delete")?;

    for key in keys {
        sqlx::query(
            r#"
            DELETE FROM kv_store
            WHERE key = ?1
            "#,
        )
        .bind(*key)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to delete {key:?}"))?;
    }

    tx.commit().await.context("failed to commit delete")?;
    Ok(())
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.runtime
            .block_on(fetch(&self.pool, key))
            .map_err(StorageError::backend)
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.runtime
            .block_on(upsert_all(&self.pool, entries))
            .map_err(StorageError::backend)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.runtime
            .block_on(delete_all(&self.pool, keys))
            .map_err(StorageError::backend)
    }
}

impl Drop for SqliteStorage {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

/// Resolve the session database path: `{dir}/session.db`, where `dir` is
/// `override_dir` when given and `{app_data_dir}/reviso` otherwise.
pub fn default_path(override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let mut dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => {
            let base = dirs::data_dir()
                .or_else(|| {
                    dirs::home_dir().map(|mut h| {
                        h.push(".local");
                        h.push("share");
                        h
                    })
                })
                .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;
            base.join("reviso")
        }
    };

    dir.push("session.db");
    Ok(dir)
}
