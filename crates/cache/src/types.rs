//! Data model shared by the stores, the memory layer and the engine

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

/// Expiry value meaning "never expires"
pub const NEVER_EXPIRE: i64 = -1;

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Persisted description of one cache entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Original cache key, not its hash
    pub key: String,
    /// Time of the last write, ms since the epoch
    pub create_time: i64,
    /// Absolute expiry in ms since the epoch; negative never expires
    pub expire_time: i64,
    /// Payload size recorded at write time
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

impl CacheMetadata {
    pub fn new(key: impl Into<String>, create_time: i64, expire_time: i64, size: u64) -> Self {
        Self {
            key: key.into(),
            create_time,
            expire_time,
            size,
            mime_type: None,
            tags: BTreeSet::new(),
            extras: BTreeMap::new(),
        }
    }

    pub fn never_expires(&self) -> bool {
        self.expire_time < 0
    }

    /// Expired relative to the current time
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }

    /// Expired relative to `now_ms`
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        !self.never_expires() && now_ms > self.expire_time
    }

    /// Time left before expiry; `None` for entries that never expire
    pub fn remaining_time(&self) -> Option<Duration> {
        self.remaining_time_at(now_millis())
    }

    pub fn remaining_time_at(&self, now_ms: i64) -> Option<Duration> {
        if self.never_expires() {
            return None;
        }
        let left = self.expire_time.saturating_sub(now_ms).max(0);
        Some(Duration::from_millis(left.unsigned_abs()))
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.create_time).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.never_expires() {
            None
        } else {
            Utc.timestamp_millis_opt(self.expire_time).single()
        }
    }
}

/// Lifetime requested for a write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ttl {
    /// Use the cache's configured default
    #[default]
    Default,
    /// Never expire
    Never,
    /// Expire this long after the write; a zero duration never expires
    After(Duration),
}

impl Ttl {
    /// Absolute expiry for a write happening at `now_ms`
    pub fn expire_time(self, now_ms: i64, default: Option<Duration>) -> i64 {
        let lifetime = match self {
            Self::Default => default,
            Self::Never => None,
            Self::After(d) => Some(d),
        };
        match lifetime.filter(|d| !d.is_zero()) {
            Some(d) => {
                let ms = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
                now_ms.saturating_add(ms)
            }
            None => NEVER_EXPIRE,
        }
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        Self::After(d)
    }
}

impl From<Option<Duration>> for Ttl {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(Self::Never, Self::After)
    }
}

/// Metadata to attach to a write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub ttl: Ttl,
    pub mime_type: Option<String>,
    pub tags: BTreeSet<String>,
    pub extras: BTreeMap<String, String>,
}

impl PutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.ttl = ttl.into();
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn extra(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(name.into(), value.into());
        self
    }
}

impl From<Ttl> for PutOptions {
    fn from(ttl: Ttl) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }
}

/// Snapshot of cache usage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    /// Sum of blob sizes on disk
    pub total_size: u64,
    /// Number of metadata records
    pub item_count: usize,
    /// Records past their expiry that have not been swept yet
    pub expired_count: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
    /// Last read or write, ms since the epoch; zero before any access
    pub last_access_time: i64,
    /// Advisory size limit, if configured
    pub max_size: Option<u64>,
}

impl CacheStatistics {
    pub fn hit_rate_of(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Whether the total size is beyond the advisory limit
    pub fn over_capacity(&self) -> bool {
        self.max_size.is_some_and(|max| self.total_size > max)
    }
}

impl fmt::Display for CacheStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size={}B items={} expired={} hits={} misses={} hit_rate={:.2}%",
            self.total_size,
            self.item_count,
            self.expired_count,
            self.hit_count,
            self.miss_count,
            self.hit_rate * 100.0
        )?;
        if let Some(max) = self.max_size {
            write!(f, " max={max}B")?;
        }
        Ok(())
    }
}

/// How a caller intends to combine the cache with a remote source
///
/// The engine does not act on this; it exists so callers can describe their
/// policy in one vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStrategy {
    /// Only read from the cache
    CacheOnly,
    /// Always go to the remote source, never the cache
    NetworkOnly,
    /// Cache first, remote source on a miss
    #[default]
    CacheFirst,
    /// Remote source first, cache as a fallback
    NetworkFirst,
    /// Fetch every time and refresh the cached copy
    AlwaysRefresh,
}

/// A value held by the memory layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub value: String,
    pub metadata: CacheMetadata,
}
