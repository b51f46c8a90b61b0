//! Write operations

use crate::core::types::Cache;
use crate::keys::hash_key;
use crate::types::{now_millis, CacheMetadata, PutOptions, Ttl};
use tracing::{error, info};

impl Cache {
    /// Store a string value, replacing any previous value of `key`
    pub async fn put_string(&self, key: &str, value: &str, ttl: impl Into<Ttl>) -> bool {
        self.put_string_with(key, value, PutOptions::from(ttl.into())).await
    }

    /// Store a string value with explicit metadata
    pub async fn put_string_with(&self, key: &str, value: &str, options: PutOptions) -> bool {
        self.write_entry(key, value.as_bytes(), options, Some(value)).await
    }

    /// Store raw bytes, replacing any previous value of `key`
    pub async fn put_bytes(&self, key: &str, value: &[u8], ttl: impl Into<Ttl>) -> bool {
        self.put_bytes_with(key, value, PutOptions::from(ttl.into())).await
    }

    /// Store raw bytes with explicit metadata
    pub async fn put_bytes_with(&self, key: &str, value: &[u8], options: PutOptions) -> bool {
        self.write_entry(key, value, options, None).await
    }

    /// Write blob and metadata together under the key lock
    ///
    /// On failure the previous entry, if any, is still what readers see.
    /// `text` is the string form of `data` when the caller already has it; it
    /// goes into the memory layer. Byte writes drop the memory entry instead.
    async fn write_entry(&self, key: &str, data: &[u8], options: PutOptions, text: Option<&str>) -> bool {
        let inner = &self.inner;
        let hash = hash_key(key);
        let _guard = inner.locks.lock(&hash).await;

        let now = now_millis();
        let metadata = self.build_metadata(key, now, data.len() as u64, options);

        if let Err(e) = inner.store.write_entry(&hash, data, &metadata).await {
            error!(key = %key, error = %e, "Failed to write cache entry");
            return false;
        }

        let published = match text {
            Some(text) => {
                inner.memory.put(key, text.to_string(), metadata.clone());
                Some(text.to_string())
            }
            None => {
                inner.memory.remove(key);
                if inner.notifier.is_observed(key) {
                    std::str::from_utf8(data).ok().map(str::to_owned)
                } else {
                    None
                }
            }
        };
        inner.notifier.publish(key, published);
        inner.stats.touch(now);

        info!(
            key = %key,
            size = metadata.size,
            expire_time = metadata.expire_time,
            "Cached entry"
        );
        true
    }

    pub(super) fn build_metadata(&self, key: &str, now: i64, size: u64, options: PutOptions) -> CacheMetadata {
        let expire_time = options.ttl.expire_time(now, self.inner.config.default_ttl());
        CacheMetadata {
            key: key.to_string(),
            create_time: now,
            expire_time,
            size,
            mime_type: options.mime_type,
            tags: options.tags,
            extras: options.extras,
        }
    }
}
