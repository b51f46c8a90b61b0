//! Read operations

use crate::core::types::Cache;
use crate::keys::hash_key;
use crate::types::{now_millis, CacheMetadata};
use tracing::debug;

use super::validate::decode_text;

impl Cache {
    /// Current string value of `key`
    ///
    /// Served from memory when a valid entry is resident, otherwise from disk,
    /// repopulating memory. Expired, missing and non-text entries are misses.
    pub async fn get_string(&self, key: &str) -> Option<String> {
        let inner = &self.inner;
        let now = now_millis();

        if let Some(value) = inner.memory.get_valid(key, now) {
            inner.stats.record_hit(now);
            debug!(key = %key, "Memory cache hit");
            return Some(value);
        }

        let hash = hash_key(key);
        let loaded = match self.valid_metadata(key, &hash).await {
            Some(metadata) => self
                .read_blob(key, &hash)
                .await
                .and_then(|bytes| decode_text(key, bytes))
                .map(|value| (value, metadata)),
            None => None,
        };

        match loaded {
            Some((value, metadata)) => {
                self.remember(key, &hash, value.clone(), metadata).await;
                inner.stats.record_hit(now);
                debug!(key = %key, "Disk cache hit");
                Some(value)
            }
            None => {
                inner.stats.record_miss(now);
                debug!(key = %key, "Cache miss");
                None
            }
        }
    }

    /// Current bytes of `key`
    pub async fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        let inner = &self.inner;
        let now = now_millis();

        if let Some(value) = inner.memory.get_valid(key, now) {
            inner.stats.record_hit(now);
            debug!(key = %key, "Memory cache hit");
            return Some(value.into_bytes());
        }

        let hash = hash_key(key);
        let bytes = match self.valid_metadata(key, &hash).await {
            Some(_) => self.read_blob(key, &hash).await,
            None => None,
        };

        if bytes.is_some() {
            inner.stats.record_hit(now);
            debug!(key = %key, "Disk cache hit");
        } else {
            inner.stats.record_miss(now);
            debug!(key = %key, "Cache miss");
        }
        bytes
    }

    /// Put a value read from disk into memory, backing out if `key` was rewritten meanwhile
    ///
    /// A writer that commits after the re-check replaces or drops the memory
    /// entry itself, so memory never outlives a newer disk value.
    async fn remember(&self, key: &str, hash: &str, value: String, metadata: CacheMetadata) {
        let inner = &self.inner;
        if !inner.memory.is_enabled() {
            return;
        }
        let loaded = metadata.clone();
        inner.memory.put(key, value, metadata);
        match inner.store.metadata.load(hash).await {
            Ok(Some(current)) if current == loaded => {}
            _ => {
                inner.memory.remove(key);
            }
        }
    }
}
