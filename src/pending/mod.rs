//! On-disk holding area for print receipts awaiting download.
//!
//! A pending file outlives the request that created it so the browser can
//! fetch it on a follow-up request (possibly more than once). Files are not
//! removed on download; the purge worker clears them once they are stale.

pub mod purge;


use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use uuid::Uuid;

use crate::receipt::model::ContributionContext;

const FILE_PREFIX: &str = "receipt-";
const FILE_EXTENSION: &str = "pdf";

#[derive(Debug, Error)]
pub enum PendingFileError {
    #[error("failed to prepare pending file directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write pending file: {0}")]
    Write(#[source] io::Error),
    #[error("failed to read pending file: {0}")]
    Read(#[source] io::Error),
    #[error("failed to scan pending file directory: {0}")]
    Scan(#[source] io::Error),
}

#[derive(Debug, Clone)]
pub struct PendingFileStore {
    dir: PathBuf,
}

impl PendingFileStore {
    /// Use `dir` as the holding area, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, PendingFileError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| PendingFileError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        log::info!("Pending receipt files stored in {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn write(
        &self,
        context: &ContributionContext,
        document: &[u8],
    ) -> Result<PathBuf, PendingFileError> {
        let filename = format!(
            "{}{}-{}-{}.{}",
            FILE_PREFIX,
            context.contribution_id,
            context.contact_id,
            Uuid::new_v4().simple(),
            FILE_EXTENSION
        );
        let path = self.dir.join(filename);
        tokio::fs::write(&path, document)
            .await
            .map_err(PendingFileError::Write)?;
        log::debug!(
            "Stored pending receipt {} ({} bytes)",
            path.display(),
            document.len()
        );
        Ok(path)
    }

    /// Contents of a pending file, or `None` when it is gone or lies outside the holding area.
    pub async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, PendingFileError> {
        if path.parent() != Some(self.dir.as_path()) {
            log::warn!(
                "Refusing to read {} outside the pending file directory",
                path.display()
            );
            return Ok(None);
        }

        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PendingFileError::Read(e)),
        }
    }

    /// Delete pending files last modified at least `max_age` ago. Returns how many were removed.
    pub async fn purge_older_than(&self, max_age: Duration) -> Result<usize, PendingFileError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(PendingFileError::Scan)?;
        let now = SystemTime::now();
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await.map_err(PendingFileError::Scan)? {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(FILE_PREFIX) {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    log::warn!("Skipping {:?}: {}", name, e);
                    continue;
                }
            };
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age < max_age {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove stale receipt {:?}: {}", name, e),
            }
        }

        Ok(removed)
    }
}
