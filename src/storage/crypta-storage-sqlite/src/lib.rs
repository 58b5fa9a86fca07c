//! # Crypta Storage - SQLite Backend
//!
//! SQLite implementation of the record store. Each named store gets its own
//! database file under a data directory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crypta_storage::{Record, RecordId, RecordStore, StorageError};

/// SQLite record store.
///
/// The database lives at `{base_path}/{name}.db`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens or creates a SQLite record store.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Directory where store databases are kept
    /// * `name` - Store name (must match `[a-z0-9_-]+`)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Store name is invalid
    /// - Directory cannot be created
    /// - Database connection or schema creation fails
    pub async fn open(base_path: impl AsRef<Path>, name: &str) -> Result<Self, StorageError> {
        Self::validate_name(name)?;

        let base = base_path.as_ref();
        std::fs::create_dir_all(base)
            .map_err(|e| StorageError::Connection(format!("failed to create directory: {e}")))?;

        let db_path = base.join(format!("{name}.db"));
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        debug!(store = %name, path = %db_path.display(), "Opening SQLite database");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool, db_path };

        store.migrate().await?;

        info!(store = %name, "SQLite record store ready");

        Ok(store)
    }

    /// Returns the path of the database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Validates that a store name is safe to use as a file name.
    ///
    /// Only allows: lowercase letters, digits, underscore, hyphen.
    fn validate_name(name: &str) -> Result<(), StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidInput("store name cannot be empty".into()));
        }

        if name.len() > 64 {
            return Err(StorageError::InvalidInput("store name too long".into()));
        }

        let valid = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if !valid {
            return Err(StorageError::InvalidInput(
                "store name must match [a-z0-9_-]+".into(),
            ));
        }

        Ok(())
    }

    /// Runs database migrations.
    async fn migrate(&self) -> Result<(), StorageError> {
        debug!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS data (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                data       TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(format!("migration failed: {e}")))?;

        debug!("Migrations complete");

        Ok(())
    }

    /// Returns the current Unix timestamp.
    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn find_all(&self) -> Result<Vec<Record>, StorageError> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, data FROM data ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(|(id, data)| Record::new(id, data)).collect())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, StorageError> {
        let row: Option<(i64, String)> = sqlx::query_as("SELECT id, data FROM data WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(row.map(|(id, data)| Record::new(id, data)))
    }

    async fn save(&self, id: Option<RecordId>, data: String) -> Result<Record, StorageError> {
        let now = Self::now();

        let id = match id {
            Some(id) => {
                sqlx::query(
                    r#"
                    INSERT INTO data (id, data, created_at, updated_at)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT(id) DO UPDATE SET
                        data = excluded.data,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(id)
                .bind(&data)
                .bind(now)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?;

                id
            }
            None => sqlx::query("INSERT INTO data (data, created_at, updated_at) VALUES (?, ?, ?)")
                .bind(&data)
                .bind(now)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?
                .last_insert_rowid(),
        };

        Ok(Record::new(id, data))
    }

    async fn exists_by_id(&self, id: RecordId) -> Result<bool, StorageError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM data WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(row.is_some())
    }
}
