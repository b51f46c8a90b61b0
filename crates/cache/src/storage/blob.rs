//! Blob store: raw payload bytes, one file per entry in the cache root

use super::{paths, remove_file, write_atomic};
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::keys::is_hashed_name;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, hash: &str) -> PathBuf {
        paths::blob_path(&self.root, hash)
    }

    pub async fn write(&self, hash: &str, data: &[u8]) -> Result<()> {
        write_atomic(&self.path(hash), data).await
    }

    /// Copy `reader` into a staging file for `hash`, returning its path and the bytes written
    ///
    /// Nothing is committed; [`super::DiskStore::write_entry_stream`] moves it into place.
    pub(crate) async fn stage_stream<R>(&self, hash: &str, reader: &mut R) -> Result<(PathBuf, u64)>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CacheError::io(&self.root, "create cache directory", e))?;

        let staging = paths::staging_path(&self.path(hash));
        match copy_to(&staging, reader).await {
            Ok(written) => Ok((staging, written)),
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                Err(CacheError::io(staging, "stream into staging file", e))
            }
        }
    }

    /// Read the blob for `hash`; `Ok(None)` when there is none
    pub async fn read(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(hash);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(path, "read blob file", e)),
        }
    }

    pub async fn exists(&self, hash: &str) -> bool {
        fs::try_exists(self.path(hash)).await.unwrap_or(false)
    }

    pub async fn delete(&self, hash: &str) -> Result<bool> {
        remove_file(&self.path(hash), "remove blob file").await
    }

    /// Sum of the sizes of all blob files, walking the directory off the async runtime
    pub async fn total_size(&self, cancel: &CancellationToken) -> Result<u64> {
        let root = self.root.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || walk_blob_sizes(&root, &cancel))
            .await
            .map_err(|e| CacheError::Io {
                path: self.root.clone(),
                operation: "join size scan",
                source: std::io::Error::other(e),
                recovery_hint: RecoveryHint::Retry {
                    after: std::time::Duration::from_millis(100),
                },
            })?
    }
}

async fn copy_to<R>(staging: &Path, reader: &mut R) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = fs::File::create(staging).await?;
    let written = tokio::io::copy(reader, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

fn walk_blob_sizes(root: &Path, cancel: &CancellationToken) -> Result<u64> {
    let mut total = 0u64;
    let mut processed = 0usize;
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled {
                operation: "cache size scan",
                processed,
                recovery_hint: RecoveryHint::Ignore,
            });
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.io_error().map(|io| io.kind()) == Some(std::io::ErrorKind::NotFound) => {
                continue
            }
            Err(e) => {
                return Err(CacheError::io(
                    root,
                    "walk cache directory",
                    std::io::Error::other(e.to_string()),
                ))
            }
        };
        if !entry.file_type().is_file() || !is_hashed_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        // A blob removed between listing and stat is simply not counted
        if let Ok(meta) = entry.metadata() {
            total += meta.len();
        }
        processed += 1;
    }
    Ok(total)
}
