//! Integration tests for the public cache contract

use hoard_cache::{
    build_cache_key, Cache, CacheConfig, CacheConfigBuilder, CachePreset, PutOptions, Ttl,
};
use std::time::Duration;
use tempfile::TempDir;

async fn open(temp_dir: &TempDir, name: &str, preset: CachePreset) -> Cache {
    let config = CacheConfigBuilder::from_preset(preset)
        .with_base_dir(temp_dir.path())
        .with_root_dir_name(name)
        .build();
    Cache::new(config).await.unwrap()
}

#[tokio::test]
async fn test_presets_are_independent_instances() {
    let temp_dir = TempDir::new().unwrap();
    let short = open(&temp_dir, "short", CachePreset::ShortTerm).await;
    let long = open(&temp_dir, "long", CachePreset::LongTerm).await;

    assert!(short.put_string("k", "short", Ttl::Default).await);
    assert!(long.put_string("k", "long", Ttl::Default).await);

    assert_eq!(short.get_string("k").await.as_deref(), Some("short"));
    assert_eq!(long.get_string("k").await.as_deref(), Some("long"));

    let short_meta = short.get_metadata("k").await.unwrap();
    let long_meta = long.get_metadata("k").await.unwrap();
    assert_eq!(short_meta.expire_time - short_meta.create_time, 60 * 60 * 1000);
    assert_eq!(long_meta.expire_time - long_meta.create_time, 30 * 24 * 60 * 60 * 1000);

    assert!(short.clear().await);
    assert_eq!(long.get_string("k").await.as_deref(), Some("long"));
}

#[tokio::test]
async fn test_permanent_preset_never_expires() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir, "perm", CachePreset::Permanent).await;

    assert!(cache.put_string("k", "v", Ttl::Default).await);
    let meta = cache.get_metadata("k").await.unwrap();
    assert!(meta.never_expires());
    assert_eq!(meta.remaining_time(), None);
}

#[tokio::test]
async fn test_entries_survive_reopening() {
    let temp_dir = TempDir::new().unwrap();
    {
        let cache = open(&temp_dir, "persist", CachePreset::Default).await;
        assert!(
            cache
                .put_string_with(
                    "k",
                    "v",
                    PutOptions::new()
                        .mime_type("text/plain")
                        .tag("t")
                        .extra("etag", "abc"),
                )
                .await
        );
        assert!(cache.put_bytes("b", &[1, 2, 3], Ttl::Never).await);
    }

    let cache = open(&temp_dir, "persist", CachePreset::Default).await;
    assert_eq!(cache.get_string("k").await.as_deref(), Some("v"));
    assert_eq!(cache.get_bytes("b").await, Some(vec![1, 2, 3]));

    let meta = cache.get_metadata("k").await.unwrap();
    assert_eq!(meta.key, "k");
    assert_eq!(meta.mime_type.as_deref(), Some("text/plain"));
    assert!(meta.tags.contains("t"));
    assert_eq!(meta.extras["etag"], "abc");
}

#[tokio::test]
async fn test_on_disk_layout() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir, "layout", CachePreset::Default).await;
    assert!(cache.put_string("some/key with spaces", "v", Ttl::Default).await);

    let hash = hoard_cache::hash_key("some/key with spaces");
    assert!(cache.root().join(&hash).is_file());
    let record = cache.root().join(".metadata").join(format!("{hash}.meta"));
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(record).unwrap()).unwrap();
    assert_eq!(json["key"], "some/key with spaces");
    assert_eq!(json["size"], 1);
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfig {
        memory_cache_max_entries: 0,
        ..CacheConfigBuilder::new().with_cache_dir(temp_dir.path()).build()
    };
    let err = Cache::new(config).await.unwrap_err();
    assert!(matches!(err, hoard_cache::CacheError::Configuration { .. }));
}

#[tokio::test]
async fn test_encryption_flag_is_accepted_but_inert() {
    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfigBuilder::new()
        .with_cache_dir(temp_dir.path().join("enc"))
        .with_encryption(true, Some("secret".to_string()))
        .build();
    let cache = Cache::new(config).await.unwrap();

    assert!(cache.put_string("k", "plain", Ttl::Default).await);
    let blob = std::fs::read(cache.root().join(hoard_cache::hash_key("k"))).unwrap();
    assert_eq!(blob, b"plain");
}

#[tokio::test]
async fn test_built_keys_work_as_cache_keys() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir, "keys", CachePreset::Default).await;
    let key = build_cache_key(["user", "42", "profile"]);

    assert!(cache.put_string(&key, "v", Duration::from_secs(5)).await);
    assert_eq!(cache.get_keys_by_prefix("user_42").await, vec![key]);
}
