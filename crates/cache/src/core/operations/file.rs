//! Stream-oriented writes and path-returning reads

use crate::core::types::Cache;
use crate::keys::hash_key;
use crate::types::{now_millis, PutOptions, Ttl};
use std::path::PathBuf;
use tokio::io::AsyncRead;
use tracing::{debug, error, info};

use super::validate::decode_text;

impl Cache {
    /// Copy everything `reader` yields into the entry for `key`
    pub async fn put_file<R>(&self, key: &str, reader: &mut R, ttl: impl Into<Ttl>) -> bool
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.put_file_with(key, reader, PutOptions::from(ttl.into())).await
    }

    pub async fn put_file_with<R>(&self, key: &str, reader: &mut R, options: PutOptions) -> bool
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let inner = &self.inner;
        let hash = hash_key(key);
        let _guard = inner.locks.lock(&hash).await;

        let now = now_millis();
        let written = inner
            .store
            .write_entry_stream(&hash, reader, |size| {
                self.build_metadata(key, now, size, options)
            })
            .await;
        let size = match written {
            Ok(metadata) => metadata.size,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to write cache file");
                return false;
            }
        };

        inner.memory.remove(key);
        if inner.notifier.is_observed(key) {
            let text = self
                .read_blob(key, &hash)
                .await
                .and_then(|bytes| decode_text(key, bytes));
            inner.notifier.publish(key, text);
        }
        inner.stats.touch(now);

        info!(key = %key, size, "Cached file");
        true
    }

    /// Path of the blob holding `key`'s payload
    ///
    /// The path stays valid until the entry is next written or removed.
    pub async fn get_file(&self, key: &str) -> Option<PathBuf> {
        let inner = &self.inner;
        let now = now_millis();
        let hash = hash_key(key);

        match self.valid_metadata(key, &hash).await {
            Some(_) => {
                inner.stats.record_hit(now);
                debug!(key = %key, "Cache file hit");
                Some(inner.store.blobs.path(&hash))
            }
            None => {
                inner.stats.record_miss(now);
                debug!(key = %key, "Cache file miss");
                None
            }
        }
    }
}
