//! Internal counters for the cache engine

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Hit/miss counters and last access time
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    /// Last read or write, ms since the epoch
    pub last_access: AtomicI64,
}

impl CacheStats {
    pub fn record_hit(&self, now_ms: i64) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.touch(now_ms);
    }

    pub fn record_miss(&self, now_ms: i64) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.touch(now_ms);
    }

    pub fn touch(&self, now_ms: i64) {
        self.last_access.fetch_max(now_ms, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.last_access.store(0, Ordering::Relaxed);
    }

    /// (hits, misses, last access)
    pub fn snapshot(&self) -> (u64, u64, i64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.last_access.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_reset() {
        let stats = CacheStats::default();
        stats.record_hit(10);
        stats.record_miss(5);
        assert_eq!(stats.snapshot(), (1, 1, 10));

        stats.reset();
        assert_eq!(stats.snapshot(), (0, 0, 0));
    }
}
