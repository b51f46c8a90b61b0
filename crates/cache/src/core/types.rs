//! Core cache types and structures

use crate::config::CacheConfig;
use crate::memory::MemoryCache;
use crate::notifier::ChangeNotifier;
use crate::storage::DiskStore;
use std::path::Path;
use std::sync::Arc;

use super::internal::CacheStats;
use super::locks::KeyLocks;

/// Handle to one cache instance
///
/// Cloning is cheap; all clones share the same directory, memory layer,
/// counters and observers.
#[derive(Clone)]
pub struct Cache {
    pub(super) inner: Arc<CacheInner>,
}

pub(super) struct CacheInner {
    pub config: CacheConfig,
    pub store: DiskStore,
    pub memory: MemoryCache,
    pub notifier: ChangeNotifier,
    pub locks: KeyLocks,
    pub stats: CacheStats,
}

impl Cache {
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Root directory holding this cache's files
    pub fn root(&self) -> &Path {
        self.inner.store.root()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("root", &self.inner.store.root())
            .field("memory", &self.inner.memory)
            .field("observed_keys", &self.inner.notifier.channel_count())
            .finish()
    }
}
