//! Bounded in-memory layer in front of the disk stores
//!
//! Holds the last read or written string value of a key together with its
//! metadata. It is only an accelerator: entries are dropped freely and the
//! disk stores remain the source of truth.

use crate::types::{CacheEntry, CacheMetadata};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

pub struct MemoryCache {
    lru: Option<Mutex<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// A layer holding at most `capacity` entries; disabled when `enabled` is false or `capacity` is zero
    pub fn new(enabled: bool, capacity: usize) -> Self {
        let lru = NonZeroUsize::new(capacity)
            .filter(|_| enabled)
            .map(|capacity| Mutex::new(LruCache::new(capacity)));
        Self { lru }
    }

    pub fn disabled() -> Self {
        Self { lru: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.lru.is_some()
    }

    /// Value for `key` if present and unexpired at `now_ms`, marking it recently used
    ///
    /// An expired entry is dropped from memory only; deleting it on disk is the caller's job.
    pub fn get_valid(&self, key: &str, now_ms: i64) -> Option<String> {
        let mut lru = self.lru.as_ref()?.lock();
        let expired = lru.get(key)?.metadata.is_expired_at(now_ms);
        if expired {
            lru.pop(key);
            return None;
        }
        lru.peek(key).map(|entry| entry.value.clone())
    }

    /// Insert or refresh an entry, evicting the least recently used one past capacity
    pub fn put(&self, key: &str, value: String, metadata: CacheMetadata) {
        if let Some(lru) = &self.lru {
            lru.lock().put(key.to_string(), CacheEntry { value, metadata });
        }
    }

    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        self.lru.as_ref()?.lock().pop(key)
    }

    /// Replace the embedded metadata of a resident entry without touching recency
    pub fn update_metadata(&self, key: &str, metadata: &CacheMetadata) {
        if let Some(lru) = &self.lru {
            if let Some(entry) = lru.lock().peek_mut(key) {
                entry.metadata = metadata.clone();
            }
        }
    }

    /// Whether `key` is resident, without touching recency
    pub fn contains(&self, key: &str) -> bool {
        self.lru.as_ref().is_some_and(|lru| lru.lock().contains(key))
    }

    pub fn clear(&self) {
        if let Some(lru) = &self.lru {
            lru.lock().clear();
        }
    }

    pub fn len(&self) -> usize {
        self.lru.as_ref().map_or(0, |lru| lru.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lru.as_ref().map_or(0, |lru| lru.lock().cap().get())
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("enabled", &self.is_enabled())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NEVER_EXPIRE;

    fn meta(key: &str, expire_time: i64) -> CacheMetadata {
        CacheMetadata::new(key, 0, expire_time, 1)
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let memory = MemoryCache::new(true, 2);
        memory.put("a", "1".into(), meta("a", NEVER_EXPIRE));
        memory.put("b", "2".into(), meta("b", NEVER_EXPIRE));
        assert_eq!(memory.get_valid("a", 0).as_deref(), Some("1"));

        memory.put("c", "3".into(), meta("c", NEVER_EXPIRE));

        assert!(memory.contains("a"));
        assert!(!memory.contains("b"));
        assert!(memory.contains("c"));
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let memory = MemoryCache::new(true, 4);
        memory.put("a", "1".into(), meta("a", 100));
        assert_eq!(memory.get_valid("a", 100).as_deref(), Some("1"));
        assert_eq!(memory.get_valid("a", 101), None);
        assert!(!memory.contains("a"));
    }

    #[test]
    fn test_update_metadata() {
        let memory = MemoryCache::new(true, 4);
        memory.put("a", "1".into(), meta("a", 100));
        memory.update_metadata("a", &meta("a", NEVER_EXPIRE));
        assert_eq!(memory.get_valid("a", 1_000).as_deref(), Some("1"));
    }

    #[test]
    fn test_disabled_layer_holds_nothing() {
        for memory in [MemoryCache::new(false, 10), MemoryCache::new(true, 0), MemoryCache::disabled()] {
            memory.put("a", "1".into(), meta("a", NEVER_EXPIRE));
            assert!(!memory.is_enabled());
            assert!(memory.is_empty());
            assert_eq!(memory.get_valid("a", 0), None);
        }
    }
}
