//! Metadata-only updates; the blob is never touched

use crate::core::types::Cache;
use crate::keys::hash_key;
use crate::types::CacheMetadata;
use std::collections::BTreeSet;
use tracing::{debug, error, info};

impl Cache {
    /// Replace the tag set of `key`; false when it has no metadata
    pub async fn set_tags<I, S>(&self, key: &str, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        self.update_metadata(key, "set tags", move |metadata| {
            metadata.tags = tags;
        })
        .await
    }

    /// Set the absolute expiry of `key` in ms since the epoch; negative never expires
    pub async fn update_expire_time(&self, key: &str, expire_time: i64) -> bool {
        self.update_metadata(key, "update expire time", move |metadata| {
            metadata.expire_time = expire_time;
        })
        .await
    }

    /// Apply `change` to the stored metadata of `key` under its lock
    pub(super) async fn update_metadata<F>(&self, key: &str, operation: &'static str, change: F) -> bool
    where
        F: FnOnce(&mut CacheMetadata),
    {
        self.try_update_metadata(key, operation, |metadata| {
            change(metadata);
            true
        })
        .await
    }

    /// Like [`Cache::update_metadata`], where `change` may decline by returning false
    pub(super) async fn try_update_metadata<F>(&self, key: &str, operation: &'static str, change: F) -> bool
    where
        F: FnOnce(&mut CacheMetadata) -> bool,
    {
        let inner = &self.inner;
        let hash = hash_key(key);
        let _guard = inner.locks.lock(&hash).await;

        let mut metadata = match inner.store.metadata.load(&hash).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                debug!(key = %key, operation, "No metadata to update");
                return false;
            }
            Err(e) => {
                error!(key = %key, operation, error = %e, "Failed to load cache metadata");
                return false;
            }
        };

        if !change(&mut metadata) {
            debug!(key = %key, operation, "Metadata update declined");
            return false;
        }

        if let Err(e) = inner.store.metadata.save(&hash, &metadata).await {
            error!(key = %key, operation, error = %e, "Failed to write cache metadata");
            inner.memory.remove(key);
            return false;
        }
        inner.memory.update_metadata(key, &metadata);

        info!(key = %key, operation, "Updated cache metadata");
        true
    }
}
