//! Media-root scanner
//!
//! Walks the configured media directory at startup and registers every
//! regular file in the attachment index. Files are visited in sorted
//! path order so attachment ids are stable across restarts against an
//! unchanged tree.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::AttachmentStore;

/// Scanner for the on-disk media library
pub struct MediaScanner {
    root: PathBuf,
}

impl MediaScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scan the media root and index every file found. Returns the
    /// number of files registered.
    pub async fn scan(&self, store: &AttachmentStore<'_>) -> Result<usize> {
        tracing::info!("Scanning media root {}", self.root.display());
        let start = std::time::Instant::now();

        let mut files = Vec::new();
        collect_files(&self.root, &mut files)?;
        files.sort();

        let mut registered = 0;
        for path in &files {
            let display_name = file_name(path);
            let mime_type = mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string();

            store.insert(path, &mime_type, &display_name).await?;
            registered += 1;
        }

        tracing::info!(
            "Media scan complete: {} files in {:?}",
            registered,
            start.elapsed()
        );
        Ok(registered)
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
