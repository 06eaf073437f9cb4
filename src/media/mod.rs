//! Attachment index and media-root scanner

mod scanner;
mod store;

pub use scanner::MediaScanner;
pub use store::AttachmentStore;

use std::path::PathBuf;
use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use crate::error::Result;

/// A resolved attachment, ready to be streamed.
///
/// `size_bytes` is taken from a fresh stat of the file at resolution
/// time so the announced Content-Length always matches the bytes on
/// disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub absolute_path: PathBuf,
    pub mime_type: String,
    pub display_name: String,
    pub size_bytes: u64,
}

/// Open the attachment database and run schema setup.
pub async fn create_pool(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    AttachmentStore::new(&pool).init().await?;
    Ok(pool)
}
