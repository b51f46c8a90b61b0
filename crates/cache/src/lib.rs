//! Persistent key-value cache
//!
//! This crate provides a generic on-disk cache with:
//! - Per-entry expiration with a never-expire sentinel
//! - Tagging and metadata-only updates
//! - A bounded least-recently-used memory layer
//! - Per-key change observation
//! - An expired-entry sweep and a periodic scheduler to drive it
//!
//! ```no_run
//! use hoard_cache::{Cache, CacheConfigBuilder, Ttl};
//! use std::time::Duration;
//!
//! # async fn demo() -> hoard_cache::Result<()> {
//! let cache = Cache::new(CacheConfigBuilder::new().with_cache_dir("/tmp/hoard-demo").build()).await?;
//! cache.put_string("greeting", "hello", Duration::from_secs(60)).await;
//! assert_eq!(cache.get_string("greeting").await.as_deref(), Some("hello"));
//! cache.put_string("pinned", "forever", Ttl::Never).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod errors;
pub mod keys;
pub mod memory;
pub mod notifier;
pub mod storage;
pub mod types;

pub use config::{
    CacheConfig, CacheConfigBuilder, CacheConfigLoader, CacheConfiguration, CachePreset,
    ConfigSource,
};
pub use crate::core::{Cache, CleanupScheduler, CleanupStatus, ExpirySweep, RetryPolicy};
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use keys::{build_cache_key, build_prefixed_cache_key, hash_key};
pub use types::{
    CacheEntry, CacheMetadata, CacheStatistics, CacheStrategy, PutOptions, Ttl, NEVER_EXPIRE,
};

pub use tokio_util::sync::CancellationToken;
