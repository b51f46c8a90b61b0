//! Metadata store: one JSON record per entry under `.metadata`

use super::{commit, paths, remove_file, stage};
use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use crate::keys::hash_key;
use crate::types::CacheMetadata;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct MetadataStore {
    dir: PathBuf,
}

impl MetadataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, hash: &str) -> PathBuf {
        paths::metadata_path(&self.dir, hash)
    }

    pub async fn save(&self, hash: &str, metadata: &CacheMetadata) -> Result<()> {
        let staging = self.stage(hash, metadata).await?;
        commit(&staging, &self.path(hash)).await
    }

    /// Encode `metadata` into a staging file next to its record, without committing it
    pub(crate) async fn stage(&self, hash: &str, metadata: &CacheMetadata) -> Result<PathBuf> {
        let bytes = serde_json::to_vec(metadata)
            .map_err(|e| CacheError::serialization(&metadata.key, SerializationOp::Encode, e))?;
        stage(&self.path(hash), &bytes).await
    }

    /// Load the record for `hash`; `Ok(None)` when there is none
    pub async fn load(&self, hash: &str) -> Result<Option<CacheMetadata>> {
        let path = self.path(hash);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, "read metadata file", e)),
        };
        let metadata: CacheMetadata = serde_json::from_slice(&bytes)
            .map_err(|e| CacheError::serialization(hash, SerializationOp::Decode, e))?;
        if hash_key(&metadata.key) != hash {
            return Err(CacheError::Corruption {
                key: metadata.key,
                reason: format!("record stored under {hash} belongs to another key"),
                recovery_hint: RecoveryHint::ClearAndRetry,
            });
        }
        Ok(Some(metadata))
    }

    pub async fn delete(&self, hash: &str) -> Result<bool> {
        remove_file(&self.path(hash), "remove metadata file").await
    }

    /// Every readable record on disk, expired or not
    ///
    /// Unreadable records are logged and skipped.
    pub async fn list_all(&self) -> Result<Vec<CacheMetadata>> {
        let mut records = Vec::new();
        for hash in self.list_hashes().await? {
            match self.load(&hash).await {
                Ok(Some(metadata)) => records.push(metadata),
                Ok(None) => {}
                Err(e) => warn!(hash = %hash, error = %e, "Skipping unreadable metadata record"),
            }
        }
        Ok(records)
    }

    /// Number of record files, without parsing them
    pub async fn count(&self) -> Result<usize> {
        Ok(self.list_hashes().await?.len())
    }

    async fn list_hashes(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.dir, "read metadata directory", e)),
        };

        let mut hashes = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(CacheError::io(&self.dir, "read metadata directory", e)),
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if paths::is_metadata_file(&name) {
                if let Some(hash) = name.strip_suffix(&format!(".{}", paths::METADATA_EXT)) {
                    hashes.push(hash.to_string());
                }
            }
        }
        Ok(hashes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> MetadataStore {
        MetadataStore::new(temp_dir.path().join(".metadata"))
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let hash = hash_key("k");
        let mut meta = CacheMetadata::new("k", 1, -1, 3);
        meta.tags.insert("t".to_string());

        assert_eq!(store.load(&hash).await.unwrap(), None);
        store.save(&hash, &meta).await.unwrap();
        assert_eq!(store.load(&hash).await.unwrap(), Some(meta));
        assert!(store.delete(&hash).await.unwrap());
        assert!(!store.delete(&hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error_and_skipped_by_listing() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let good = hash_key("good");
        let bad = hash_key("bad");
        store.save(&good, &CacheMetadata::new("good", 1, -1, 1)).await.unwrap();
        fs::write(store.path(&bad), b"{not json").await.unwrap();

        let err = store.load(&bad).await.unwrap_err();
        assert!(err.is_corruption());

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].key, "good");
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_record_under_foreign_hash_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let hash = hash_key("a");
        store.save(&hash, &CacheMetadata::new("b", 1, -1, 1)).await.unwrap();

        let err = store.load(&hash).await.unwrap_err();
        assert!(matches!(err, CacheError::Corruption { .. }));
        assert!(err.is_corruption());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_ignores_staging_files_and_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(store.list_all().await.unwrap().is_empty());

        let hash = hash_key("k");
        store.save(&hash, &CacheMetadata::new("k", 1, -1, 1)).await.unwrap();
        fs::write(store.dir().join(format!("{hash}.tmp.leftover")), b"{}")
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }
}
