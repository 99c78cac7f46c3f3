//! Repository for cached work metadata.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Entry, EntryRow};
use exn::ResultExt;
use rjren_catalog::models::{WorkCode, WorkMetadata};
use sqlx::SqlitePool;
use time::UtcDateTime;
use tracing::instrument;

/// Repository for managing [`WorkMetadata`] entries in the cache database.
///
/// Entries are keyed by [`WorkCode`] and are write-once: inserting a code that
/// is already present keeps the existing record. Concurrent inserts for the
/// same code are therefore harmless; exactly one of them is stored.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    // =========================================================================
    // Insert
    // =========================================================================

    /// Store `metadata` under its code, stamped with the current time.
    ///
    /// Returns `false` if an entry for the code already existed (the stored
    /// entry is left untouched).
    #[instrument(skip(self, metadata), fields(code = %metadata.code))]
    pub async fn insert(&self, metadata: &WorkMetadata) -> Result<bool> {
        let entry = Entry { metadata: metadata.clone(), cached_at: UtcDateTime::now() };
        let row = EntryRow::try_from(&entry)?;
        let result = sqlx::query(include_str!("../queries/insert_metadata.sql"))
            .bind(row.code)
            .bind(row.metadata)
            .bind(row.cached_at)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Get the cached entry for a code, if any.
    pub async fn get(&self, code: &WorkCode) -> Result<Option<Entry>> {
        let row: Option<EntryRow> = sqlx::query_as(include_str!("../queries/get_metadata.sql"))
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Entry::try_from).transpose()
    }

    /// Get only the cached metadata for a code, if any.
    pub async fn get_metadata(&self, code: &WorkCode) -> Result<Option<WorkMetadata>> {
        Ok(self.get(code).await?.map(|entry| entry.metadata))
    }

    /// List every cached entry, ordered by code.
    pub async fn list(&self) -> Result<Vec<Entry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(include_str!("../queries/list_entries.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Entry::try_from).collect::<Result<Vec<_>>>()
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Forget a single code. Returns `true` if an entry was removed.
    pub async fn remove(&self, code: &WorkCode) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_metadata.sql"))
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Forget every code. Returns the number of entries removed.
    pub async fn clear(&self) -> Result<u64> {
        let result = sqlx::query(include_str!("../queries/clear_metadata.sql"))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected())
    }
}
