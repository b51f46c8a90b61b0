//! Size, count and statistics reporting

use crate::core::types::Cache;
use crate::types::{now_millis, CacheStatistics};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

impl Cache {
    /// Total size of all blobs on disk, computed by walking the directory
    pub async fn get_cache_size(&self) -> u64 {
        self.get_cache_size_with(&CancellationToken::new())
            .await
            .unwrap_or(0)
    }

    /// Like [`Cache::get_cache_size`], giving up with `None` once `cancel` fires
    pub async fn get_cache_size_with(&self, cancel: &CancellationToken) -> Option<u64> {
        match self.inner.store.blobs.total_size(cancel).await {
            Ok(size) => {
                self.check_capacity(size);
                Some(size)
            }
            Err(e) => {
                warn!(error = %e, "Failed to compute cache size");
                None
            }
        }
    }

    /// Number of metadata records on disk, expired or not
    pub async fn get_cache_count(&self) -> usize {
        match self.inner.store.metadata.count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to count cache entries");
                0
            }
        }
    }

    pub async fn get_statistics(&self) -> CacheStatistics {
        let total_size = match self.inner.store.blobs.total_size(&CancellationToken::new()).await {
            Ok(size) => size,
            Err(e) => {
                warn!(error = %e, "Failed to compute cache size");
                0
            }
        };
        let item_count = self.get_cache_count().await;
        let now = now_millis();
        let expired_count = self
            .list_metadata()
            .await
            .iter()
            .filter(|metadata| metadata.is_expired_at(now))
            .count();
        let (hit_count, miss_count, last_access_time) = self.inner.stats.snapshot();

        let stats = CacheStatistics {
            total_size,
            item_count,
            expired_count,
            hit_count,
            miss_count,
            hit_rate: CacheStatistics::hit_rate_of(hit_count, miss_count),
            last_access_time,
            max_size: self.inner.config.size_limit(),
        };
        self.check_capacity(total_size);
        debug!(%stats, "Computed cache statistics");
        stats
    }

    fn check_capacity(&self, size: u64) {
        if let Some(max) = self.inner.config.size_limit() {
            if size > max {
                warn!(
                    size,
                    max_size = max,
                    root = %self.inner.store.root().display(),
                    "Cache exceeds its configured size limit"
                );
            }
        }
    }
}
