//! Clearing the whole cache

use crate::core::types::Cache;
use tracing::{error, info};

impl Cache {
    /// Delete every entry and reset the counters
    ///
    /// Waits for in-flight writes to finish and blocks new ones until the
    /// directory has been recreated. Observers of every key receive absence.
    pub async fn clear(&self) -> bool {
        let inner = &self.inner;
        let _exclusive = inner.locks.lock_all().await;

        let result = inner.store.reset().await;
        inner.memory.clear();
        inner.notifier.reset_all();
        inner.stats.reset();

        match result {
            Ok(()) => {
                info!(root = %inner.store.root().display(), "Cache cleared");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to clear cache directory");
                false
            }
        }
    }
}
