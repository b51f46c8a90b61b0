//! Cache builder and initialization

use crate::config::CacheConfig;
use crate::errors::Result;
use crate::memory::MemoryCache;
use crate::notifier::ChangeNotifier;
use crate::storage::DiskStore;
use std::sync::Arc;
use tracing::{info, warn};

use super::internal::CacheStats;
use super::locks::KeyLocks;
use super::types::{Cache, CacheInner};

impl Cache {
    /// Open (or create) the cache described by `config`
    ///
    /// Fails only when the configuration is invalid or the root directory
    /// cannot be created.
    pub async fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let store = DiskStore::new(config.cache_root());
        store.ensure_dirs().await?;

        if config.enable_encryption {
            warn!(
                root = %store.root().display(),
                "Encryption is enabled in the configuration but not implemented; payloads are stored in plaintext"
            );
        }

        let memory = MemoryCache::new(config.enable_memory_cache, config.memory_cache_max_entries);

        info!(
            root = %store.root().display(),
            default_expire_ms = config.default_expire_ms,
            memory_entries = memory.capacity(),
            "Cache opened"
        );

        let inner = Arc::new(CacheInner {
            config,
            store,
            memory,
            notifier: ChangeNotifier::new(),
            locks: KeyLocks::new(),
            stats: CacheStats::default(),
        });

        Ok(Self { inner })
    }
}
