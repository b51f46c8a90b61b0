//! Filesystem stores for metadata records and payload blobs
//!
//! Both stores address entries by the hashed key and write through staging
//! files that are renamed over the targets. [`DiskStore::write_entry`] commits a
//! blob and its metadata as a unit, so a failed write leaves the previous entry
//! for that key untouched.

mod blob;
mod metadata;
pub mod paths;

pub use blob::BlobStore;
pub use metadata::MetadataStore;

use crate::errors::{CacheError, Result};
use crate::types::CacheMetadata;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

/// The two stores sharing one root directory
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
    pub blobs: BlobStore,
    pub metadata: MetadataStore,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let metadata_dir = root.join(paths::METADATA_DIR);
        Self {
            blobs: BlobStore::new(root.clone()),
            metadata: MetadataStore::new(metadata_dir),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and metadata directories if they are missing
    pub async fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.metadata.dir())
            .await
            .map_err(|e| CacheError::io(self.metadata.dir(), "create cache directories", e))
    }

    /// Replace the blob and metadata of `hash` together
    ///
    /// Both files are staged before either is committed. If a commit fails the
    /// previous blob is put back, or the new one removed when there was none,
    /// so readers see the previous entry or nothing, never a mix.
    pub async fn write_entry(&self, hash: &str, data: &[u8], metadata: &CacheMetadata) -> Result<()> {
        let blob_staging = stage(&self.blobs.path(hash), data).await?;
        let metadata_staging = match self.metadata.stage(hash, metadata).await {
            Ok(staging) => staging,
            Err(e) => {
                discard(&blob_staging).await;
                return Err(e);
            }
        };
        self.commit_entry(hash, &blob_staging, &metadata_staging).await
    }

    /// Like [`DiskStore::write_entry`] for a streamed payload
    ///
    /// `metadata` receives the number of bytes copied from `reader`.
    pub async fn write_entry_stream<R, F>(&self, hash: &str, reader: &mut R, metadata: F) -> Result<CacheMetadata>
    where
        R: AsyncRead + Unpin + ?Sized,
        F: FnOnce(u64) -> CacheMetadata,
    {
        let (blob_staging, size) = self.blobs.stage_stream(hash, reader).await?;
        let metadata = metadata(size);
        let metadata_staging = match self.metadata.stage(hash, &metadata).await {
            Ok(staging) => staging,
            Err(e) => {
                discard(&blob_staging).await;
                return Err(e);
            }
        };
        self.commit_entry(hash, &blob_staging, &metadata_staging).await?;
        Ok(metadata)
    }

    async fn commit_entry(&self, hash: &str, blob_staging: &Path, metadata_staging: &Path) -> Result<()> {
        let blob = self.blobs.path(hash);
        let backup = paths::staging_path(&blob);
        let had_previous = match fs::rename(&blob, &backup).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                discard(blob_staging).await;
                discard(metadata_staging).await;
                return Err(CacheError::io(&blob, "set aside previous blob", e));
            }
        };

        let committed = match commit(blob_staging, &blob).await {
            Ok(()) => commit(metadata_staging, &self.metadata.path(hash)).await,
            Err(e) => {
                discard(metadata_staging).await;
                Err(e)
            }
        };

        match committed {
            Ok(()) => {
                if had_previous {
                    discard(&backup).await;
                }
                Ok(())
            }
            Err(e) => {
                roll_back(&blob, had_previous.then_some(backup.as_path())).await;
                Err(e)
            }
        }
    }

    /// Delete everything under the root and recreate the empty layout
    pub async fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::io(&self.root, "remove cache directory", e)),
        }
        debug!(root = %self.root.display(), "Cache directory removed");
        self.ensure_dirs().await
    }
}

/// Write `data` to `target` through a uniquely named staging file
pub(crate) async fn write_atomic(target: &Path, data: &[u8]) -> Result<()> {
    let staging = stage(target, data).await?;
    commit(&staging, target).await
}

/// Write `data` to a fresh staging sibling of `target` and return its path
pub(crate) async fn stage(target: &Path, data: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| CacheError::io(parent, "create cache directory", e))?;
    }

    let staging = paths::staging_path(target);
    if let Err(e) = fs::write(&staging, data).await {
        discard(&staging).await;
        return Err(CacheError::io(staging, "write staging file", e));
    }
    Ok(staging)
}

async fn discard(staging: &Path) {
    let _ = fs::remove_file(staging).await;
}

/// Put the previous blob back, or remove the new one when there was none
async fn roll_back(blob: &Path, backup: Option<&Path>) {
    let restored = match backup {
        Some(backup) => fs::rename(backup, blob).await,
        None => match fs::remove_file(blob).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        },
    };
    if let Err(e) = restored {
        warn!(blob = %blob.display(), error = %e, "Failed to roll back cache blob");
    }
}

/// Rename a finished staging file over its target
pub(crate) async fn commit(staging: &Path, target: &Path) -> Result<()> {
    if let Err(e) = fs::rename(staging, target).await {
        discard(staging).await;
        return Err(CacheError::io(target, "rename staging file", e));
    }
    Ok(())
}

/// Remove a file, reporting whether it existed
pub(crate) async fn remove_file(path: &Path, operation: &'static str) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::io(path, operation, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_replaces_and_leaves_no_staging_files() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested").join("file");

        write_atomic(&target, b"one").await.unwrap();
        write_atomic(&target, b"two").await.unwrap();

        assert_eq!(fs::read(&target).await.unwrap(), b"two");
        let names: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_recreates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path().join("cache"));
        store.ensure_dirs().await.unwrap();
        fs::write(store.root().join("junk"), b"x").await.unwrap();

        store.reset().await.unwrap();

        assert!(store.metadata.dir().is_dir());
        assert!(!store.root().join("junk").exists());
    }

    #[tokio::test]
    async fn test_remove_file_reports_existence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("f");
        fs::write(&path, b"x").await.unwrap();
        assert!(remove_file(&path, "remove test file").await.unwrap());
        assert!(!remove_file(&path, "remove test file").await.unwrap());
    }
}
