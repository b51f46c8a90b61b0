//! JSON-encoded values stored through the string operations

use crate::core::types::Cache;
use crate::types::Ttl;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

impl Cache {
    /// Store `value` as its JSON encoding
    pub async fn put_object<T>(&self, key: &str, value: &T, ttl: impl Into<Ttl>) -> bool
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_string(value) {
            Ok(json) => self.put_string(key, &json, ttl).await,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to encode cache object");
                false
            }
        }
    }

    /// Decode the JSON stored under `key`; `None` when absent or not decodable as `T`
    pub async fn get_object<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let json = self.get_string(key).await?;
        decode_object(key, &json)
    }
}

pub(super) fn decode_object<T: DeserializeOwned>(key: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(key = %key, error = %e, "Cached value does not decode as the requested type");
            None
        }
    }
}
