//! Expired-entry sweeping
//!
//! The sweep itself lives on [`Cache`]; [`CleanupScheduler`] runs it
//! periodically for any [`ExpirySweep`] source.

mod background;

pub use background::{CleanupScheduler, CleanupStatus, RetryPolicy};

use crate::errors::Result;
use crate::keys::hash_key;
use crate::types::now_millis;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::types::Cache;

/// Something a [`CleanupScheduler`] can ask to delete its expired entries
#[async_trait]
pub trait ExpirySweep: Send + Sync {
    /// Delete expired entries, returning how many were removed
    async fn sweep_expired(&self, cancel: &CancellationToken) -> Result<usize>;
}

impl Cache {
    /// Delete every expired entry, returning the number removed
    ///
    /// Each candidate is checked again under its lock, so an entry rewritten
    /// after the scan is kept. Running it twice in a row removes nothing the
    /// second time.
    pub async fn clear_expired(&self) -> usize {
        self.clear_expired_with(&CancellationToken::new()).await
    }

    /// Like [`Cache::clear_expired`], stopping between entries once `cancel` fires
    ///
    /// Entries already removed stay removed; the count covers them.
    pub async fn clear_expired_with(&self, cancel: &CancellationToken) -> usize {
        match self.sweep(cancel).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "Failed to sweep expired cache entries");
                0
            }
        }
    }

    async fn sweep(&self, cancel: &CancellationToken) -> Result<usize> {
        let now = now_millis();
        let candidates: Vec<String> = self
            .inner
            .store
            .metadata
            .list_all()
            .await?
            .into_iter()
            .filter(|metadata| metadata.is_expired_at(now))
            .map(|metadata| metadata.key)
            .collect();

        let mut removed = 0;
        for key in &candidates {
            if cancel.is_cancelled() {
                info!(removed, candidates = candidates.len(), "Expired entry sweep cancelled");
                return Ok(removed);
            }
            if self.evict_if_invalid(key, &hash_key(key)).await {
                removed += 1;
            }
        }

        info!(removed, candidates = candidates.len(), "Swept expired cache entries");
        Ok(removed)
    }
}

#[async_trait]
impl ExpirySweep for Cache {
    async fn sweep_expired(&self, cancel: &CancellationToken) -> Result<usize> {
        self.sweep(cancel).await
    }
}
