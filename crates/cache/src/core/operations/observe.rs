//! Change observation

use crate::core::types::Cache;
use crate::keys::hash_key;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use super::object::decode_object;

impl Cache {
    /// Stream of `key`'s value: the current one first, then each change
    ///
    /// Absence is `None`. Only the latest value is retained, so a slow
    /// consumer skips intermediate states. The stream ends when dropped.
    pub async fn observe_key(&self, key: &str) -> WatchStream<Option<String>> {
        let hash = hash_key(key);
        let _guard = self.inner.locks.lock(&hash).await;
        let current = self.read_text(key, &hash).await;
        let receiver = self.inner.notifier.subscribe(key, current);
        debug!(key = %key, "Observing cache key");
        WatchStream::new(receiver)
    }

    /// Like [`Cache::observe_key`], decoding each value as JSON
    ///
    /// Values that do not decode as `T` are delivered as `None`.
    pub async fn observe_object<T>(&self, key: &str) -> impl Stream<Item = Option<T>> + Send + 'static
    where
        T: DeserializeOwned + Send + 'static,
    {
        let key = key.to_string();
        self.observe_key(&key)
            .await
            .map(move |value| value.and_then(|json| decode_object(&key, &json)))
    }
}
