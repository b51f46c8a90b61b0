//! Remove operations

use crate::core::types::Cache;
use crate::keys::hash_key;
use tracing::{debug, info};

impl Cache {
    /// Delete `key`; true if its blob or metadata existed
    pub async fn remove(&self, key: &str) -> bool {
        let inner = &self.inner;
        let hash = hash_key(key);
        let _guard = inner.locks.lock(&hash).await;

        let removed = self.delete_files(key, &hash).await;
        inner.memory.remove(key);
        inner.notifier.publish(key, None);

        if removed {
            info!(key = %key, "Removed cache entry");
        } else {
            debug!(key = %key, "Nothing to remove");
        }
        removed
    }

    /// Delete every key in `keys`, returning how many existed
    pub async fn remove_all<I, S>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for key in keys {
            if self.remove(key.as_ref()).await {
                removed += 1;
            }
        }
        removed
    }

    /// Delete every key tagged with `tag`
    pub async fn remove_by_tag(&self, tag: &str) -> usize {
        let keys = self.get_keys_by_tag(tag).await;
        let removed = self.remove_all(&keys).await;
        info!(tag = %tag, removed, "Removed cache entries by tag");
        removed
    }
}
