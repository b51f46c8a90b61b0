//! Existence checks, metadata lookup and key listing

use crate::core::types::Cache;
use crate::keys::hash_key;
use crate::types::CacheMetadata;
use tracing::{debug, warn};

impl Cache {
    /// Whether `key` has unexpired metadata and a blob on disk
    pub async fn contains(&self, key: &str) -> bool {
        let found = self.valid_metadata(key, &hash_key(key)).await.is_some();
        debug!(key = %key, found, "Cache contains check");
        found
    }

    /// Metadata of `key` when it is present
    pub async fn get_metadata(&self, key: &str) -> Option<CacheMetadata> {
        self.valid_metadata(key, &hash_key(key)).await
    }

    /// Every key with metadata on disk, including expired ones not yet swept
    pub async fn get_all_keys(&self) -> Vec<String> {
        self.list_metadata()
            .await
            .into_iter()
            .map(|metadata| metadata.key)
            .collect()
    }

    /// Keys tagged with `tag`, with the same listing semantics as [`Cache::get_all_keys`]
    pub async fn get_keys_by_tag(&self, tag: &str) -> Vec<String> {
        let keys: Vec<String> = self
            .list_metadata()
            .await
            .into_iter()
            .filter(|metadata| metadata.tags.contains(tag))
            .map(|metadata| metadata.key)
            .collect();
        debug!(tag = %tag, count = keys.len(), "Listed keys by tag");
        keys
    }

    /// Whether `key` is resident in the memory layer; does not affect recency
    pub fn is_memory_resident(&self, key: &str) -> bool {
        self.inner.memory.contains(key)
    }

    /// All readable metadata records; empty when the directory cannot be listed
    pub(crate) async fn list_metadata(&self) -> Vec<CacheMetadata> {
        match self.inner.store.metadata.list_all().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Failed to list cache metadata");
                Vec::new()
            }
        }
    }
}
