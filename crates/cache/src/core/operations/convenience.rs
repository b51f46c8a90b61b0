//! Helpers composed from the core operations

use crate::core::types::Cache;
use crate::types::{now_millis, CacheStatistics, Ttl};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::info;

impl Cache {
    /// Typed alias for [`Cache::put_object`]
    pub async fn put<T>(&self, key: &str, value: &T, ttl: impl Into<Ttl>) -> bool
    where
        T: Serialize + ?Sized,
    {
        self.put_object(key, value, ttl).await
    }

    /// Typed alias for [`Cache::get_object`]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        self.get_object(key).await
    }

    pub async fn get_string_or_default(&self, key: &str, default: &str) -> String {
        self.get_string(key)
            .await
            .unwrap_or_else(|| default.to_string())
    }

    pub async fn get_or_default<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        self.get_object(key).await.unwrap_or(default)
    }

    /// Cached value of `key`, or the result of `compute`, which is stored before returning
    ///
    /// A failed store still returns the computed value.
    pub async fn get_or_put<T, F, Fut>(&self, key: &str, ttl: impl Into<Ttl>, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(value) = self.get_object(key).await {
            return value;
        }
        let value = compute().await;
        self.put_object(key, &value, ttl).await;
        value
    }

    /// Whether every key is present
    pub async fn contains_all<I, S>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            if !self.contains(key.as_ref()).await {
                return false;
            }
        }
        true
    }

    /// Store `value` only when `key` is absent
    ///
    /// The check and the write are separate steps; a concurrent writer may win in between.
    pub async fn put_if_absent(&self, key: &str, value: &str, ttl: impl Into<Ttl>) -> bool {
        if self.contains(key).await {
            return false;
        }
        self.put_string(key, value, ttl).await
    }

    /// Store `value` only when `key` is present
    pub async fn update_if_present(&self, key: &str, value: &str, ttl: impl Into<Ttl>) -> bool {
        if !self.contains(key).await {
            return false;
        }
        self.put_string(key, value, ttl).await
    }

    pub async fn add_tag(&self, key: &str, tag: &str) -> bool {
        self.add_tags(key, [tag]).await
    }

    pub async fn add_tags<I, S>(&self, key: &str, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        self.try_update_metadata(key, "add tags", move |metadata| {
            if metadata.is_expired() {
                return false;
            }
            metadata.tags.extend(tags);
            true
        })
        .await
    }

    pub async fn remove_tag(&self, key: &str, tag: &str) -> bool {
        self.try_update_metadata(key, "remove tag", |metadata| {
            if metadata.is_expired() {
                return false;
            }
            metadata.tags.remove(tag);
            true
        })
        .await
    }

    /// Push the expiry of `key` back by `extra`; false for entries that never expire
    pub async fn extend_expire_time(&self, key: &str, extra: Duration) -> bool {
        let extra_ms = i64::try_from(extra.as_millis()).unwrap_or(i64::MAX);
        self.try_update_metadata(key, "extend expire time", move |metadata| {
            if metadata.never_expires() || metadata.is_expired() {
                return false;
            }
            metadata.expire_time = metadata.expire_time.saturating_add(extra_ms);
            true
        })
        .await
    }

    /// Make `key` expire `lifetime` from now
    pub async fn refresh_expire_time(&self, key: &str, lifetime: Duration) -> bool {
        let expire_time = Ttl::After(lifetime).expire_time(now_millis(), None);
        self.update_expire_time(key, expire_time).await
    }

    /// Keys whose metadata is unexpired
    pub async fn get_valid_keys(&self) -> Vec<String> {
        let now = now_millis();
        self.list_metadata()
            .await
            .into_iter()
            .filter(|metadata| !metadata.is_expired_at(now))
            .map(|metadata| metadata.key)
            .collect()
    }

    /// Keys past their expiry that have not been swept yet
    pub async fn get_expired_keys(&self) -> Vec<String> {
        let now = now_millis();
        self.list_metadata()
            .await
            .into_iter()
            .filter(|metadata| metadata.is_expired_at(now))
            .map(|metadata| metadata.key)
            .collect()
    }

    pub async fn get_keys_by_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys = self.get_all_keys().await;
        keys.retain(|key| key.starts_with(prefix));
        keys
    }

    pub async fn get_keys_by_suffix(&self, suffix: &str) -> Vec<String> {
        let mut keys = self.get_all_keys().await;
        keys.retain(|key| key.ends_with(suffix));
        keys
    }

    /// Hits over total lookups since the last clear
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses, _) = self.inner.stats.snapshot();
        CacheStatistics::hit_rate_of(hits, misses)
    }

    /// Emit the current statistics as one log event
    pub async fn log_statistics(&self) {
        let stats = self.get_statistics().await;
        info!(
            root = %self.root().display(),
            total_size = stats.total_size,
            item_count = stats.item_count,
            expired_count = stats.expired_count,
            hit_count = stats.hit_count,
            miss_count = stats.miss_count,
            hit_rate = stats.hit_rate,
            last_access_time = stats.last_access_time,
            "Cache statistics"
        );
    }
}
