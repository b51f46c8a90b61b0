//! Disk-path validation shared by the read operations
//!
//! A key is present only when its metadata is readable and unexpired and its
//! blob exists. Anything else is absent, and the leftover half is deleted
//! under the key's lock after re-checking the state there.

use crate::core::types::Cache;
use crate::types::{now_millis, CacheMetadata};
use tracing::{debug, info, warn};

/// Outcome of looking at a key on disk without locking it
pub(super) enum DiskState {
    Present(CacheMetadata),
    Missing,
    /// Expired, orphaned or unreadable; should be deleted
    Invalid,
}

impl Cache {
    /// Inspect `hash` on disk without taking its lock
    pub(super) async fn disk_state(&self, key: &str, hash: &str) -> DiskState {
        let store = &self.inner.store;
        match store.metadata.load(hash).await {
            Ok(Some(metadata)) if metadata.is_expired_at(now_millis()) => {
                debug!(key = %key, "Cache entry expired");
                DiskState::Invalid
            }
            Ok(Some(metadata)) => {
                if store.blobs.exists(hash).await {
                    DiskState::Present(metadata)
                } else {
                    warn!(key = %key, "Cache blob missing for existing metadata");
                    DiskState::Invalid
                }
            }
            Ok(None) => {
                if store.blobs.exists(hash).await {
                    debug!(key = %key, "Orphaned cache blob without metadata");
                    DiskState::Invalid
                } else {
                    DiskState::Missing
                }
            }
            Err(e) if e.is_corruption() => {
                warn!(key = %key, error = %e, "Corrupted cache metadata");
                DiskState::Invalid
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cache metadata");
                DiskState::Missing
            }
        }
    }

    /// Metadata of `key` if it is present, deleting whatever is left of it otherwise
    pub(super) async fn valid_metadata(&self, key: &str, hash: &str) -> Option<CacheMetadata> {
        match self.disk_state(key, hash).await {
            DiskState::Present(metadata) => Some(metadata),
            DiskState::Missing => None,
            DiskState::Invalid => {
                self.evict_if_invalid(key, hash).await;
                None
            }
        }
    }

    /// Delete `key` if, under its lock, it is still expired, orphaned or unreadable
    ///
    /// Returns whether anything was deleted. A key rewritten since the caller
    /// looked at it is left alone.
    pub(crate) async fn evict_if_invalid(&self, key: &str, hash: &str) -> bool {
        let _guard = self.inner.locks.lock(hash).await;
        if !matches!(self.disk_state(key, hash).await, DiskState::Invalid) {
            return false;
        }

        let removed = self.delete_files(key, hash).await;
        self.inner.memory.remove(key);
        if removed {
            self.inner.notifier.publish(key, None);
            info!(key = %key, "Removed invalid cache entry");
        }
        removed
    }

    /// Delete both files of `hash`; true if either existed. Caller holds the key lock.
    pub(super) async fn delete_files(&self, key: &str, hash: &str) -> bool {
        let store = &self.inner.store;
        let blob = store.blobs.delete(hash).await.unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "Failed to remove cache blob");
            false
        });
        let metadata = store.metadata.delete(hash).await.unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "Failed to remove cache metadata");
            false
        });
        blob || metadata
    }

    /// Text view of the blob of a present key, without touching locks or counters
    pub(super) async fn read_text(&self, key: &str, hash: &str) -> Option<String> {
        let DiskState::Present(_) = self.disk_state(key, hash).await else {
            return None;
        };
        let bytes = self.read_blob(key, hash).await?;
        decode_text(key, bytes)
    }

    pub(super) async fn read_blob(&self, key: &str, hash: &str) -> Option<Vec<u8>> {
        match self.inner.store.blobs.read(hash).await {
            Ok(Some(bytes)) => Some(bytes),
            Ok(None) => {
                warn!(key = %key, "Cache blob disappeared while reading");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cache blob");
                None
            }
        }
    }
}

pub(super) fn decode_text(key: &str, bytes: Vec<u8>) -> Option<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(_) => {
            debug!(key = %key, "Cache payload is not valid UTF-8");
            None
        }
    }
}
