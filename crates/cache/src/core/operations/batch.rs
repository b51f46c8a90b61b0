//! Multi-key operations

use crate::core::types::Cache;
use crate::types::Ttl;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::info;

impl Cache {
    /// Store every pair, returning how many writes succeeded
    pub async fn put_batch<I, K, V>(&self, entries: I, ttl: impl Into<Ttl>) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let ttl = ttl.into();
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        let results = join_all(
            entries
                .iter()
                .map(|(key, value)| self.put_string(key.as_ref(), value.as_ref(), ttl)),
        )
        .await;

        let stored = results.into_iter().filter(|ok| *ok).count();
        info!(requested = entries.len(), stored, "Stored cache batch");
        stored
    }

    /// Current value of each key, `None` for absent keys
    pub async fn get_batch<I, S>(&self, keys: I) -> HashMap<String, Option<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|key| key.as_ref().to_owned()).collect();
        let values = join_all(keys.iter().map(|key| self.get_string(key))).await;
        keys.into_iter().zip(values).collect()
    }
}
