//! Attachment database operations

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;

use crate::error::Result;

use super::ResolvedFile;

#[derive(sqlx::FromRow)]
struct AttachmentRow {
    path: String,
    mime_type: String,
    display_name: String,
}

/// Attachment repository
pub struct AttachmentStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AttachmentStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the attachments table if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attachments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL UNIQUE,
                mime_type TEXT NOT NULL,
                display_name TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Register a file, returning its attachment id. Re-registering the
    /// same path keeps the existing id.
    pub async fn insert(&self, path: &Path, mime_type: &str, display_name: &str) -> Result<i64> {
        let path_str = path.to_string_lossy();

        sqlx::query(
            r#"
            INSERT INTO attachments (path, mime_type, display_name)
            VALUES (?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET
                mime_type = excluded.mime_type,
                display_name = excluded.display_name
            "#,
        )
        .bind(path_str.as_ref())
        .bind(mime_type)
        .bind(display_name)
        .execute(self.pool)
        .await?;

        let (id,): (i64,) = sqlx::query_as("SELECT id FROM attachments WHERE path = ?")
            .bind(path_str.as_ref())
            .fetch_one(self.pool)
            .await?;

        Ok(id)
    }

    /// Resolve an attachment id to a file on disk.
    ///
    /// Returns `Ok(None)` when the id is unknown, or when the indexed
    /// path no longer points at a regular file.
    pub async fn resolve(&self, id: i64) -> Result<Option<ResolvedFile>> {
        let row = sqlx::query_as::<_, AttachmentRow>(
            "SELECT path, mime_type, display_name FROM attachments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let absolute_path = PathBuf::from(&row.path);
        let metadata = match tokio::fs::metadata(&absolute_path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return Ok(None),
        };

        Ok(Some(ResolvedFile {
            absolute_path,
            mime_type: row.mime_type,
            display_name: row.display_name,
            size_bytes: metadata.len(),
        }))
    }

    /// Number of indexed attachments.
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attachments")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
