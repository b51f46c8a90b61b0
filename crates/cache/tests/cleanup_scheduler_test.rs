//! Integration tests for the sweeper driven by the cleanup scheduler

use hoard_cache::{Cache, CacheConfigBuilder, CleanupScheduler, ExpirySweep, Ttl};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

async fn open(temp_dir: &TempDir) -> Arc<Cache> {
    let config = CacheConfigBuilder::new()
        .with_cache_dir(temp_dir.path().join("cache"))
        .with_cleanup_interval(Duration::from_millis(50))
        .build();
    Arc::new(Cache::new(config).await.unwrap())
}

#[tokio::test]
async fn test_trigger_now_sweeps_the_cache() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir).await;
    assert!(cache.put_string("old", "v", Duration::from_millis(5)).await);
    assert!(cache.put_string("new", "v", Ttl::Default).await);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let scheduler = CleanupScheduler::new(cache.clone());
    assert_eq!(scheduler.trigger_now().await.unwrap(), 1);
    assert_eq!(scheduler.trigger_now().await.unwrap(), 0);

    let status = scheduler.status();
    assert_eq!(status.runs, 2);
    assert_eq!(status.last_removed, 0);
    assert_eq!(cache.get_all_keys().await, vec!["new"]);
}

#[tokio::test]
async fn test_scheduled_sweeps_remove_expired_entries() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir).await;
    let scheduler = CleanupScheduler::for_config(cache.clone(), cache.config());
    assert!(scheduler.is_scheduled());

    for i in 0..5 {
        assert!(
            cache
                .put_string(&format!("k{i}"), "v", Duration::from_millis(10))
                .await
        );
    }

    let mut waited = Duration::ZERO;
    while cache.get_cache_count().await > 0 && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(25)).await;
        waited += Duration::from_millis(25);
    }

    assert_eq!(cache.get_cache_count().await, 0);
    assert!(scheduler.status().runs >= 1);

    scheduler.cancel();
    scheduler.join().await;
    assert!(!scheduler.is_scheduled());
}

#[tokio::test]
async fn test_cache_is_an_expiry_sweep_source() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir).await;
    assert!(cache.put_string("k", "v", Duration::from_millis(5)).await);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let source: Arc<dyn ExpirySweep> = cache.clone();
    assert_eq!(source.sweep_expired(&CancellationToken::new()).await.unwrap(), 1);
}
