
use crate::config::CacheConfigBuilder;
use crate::core::Cache;
use tempfile::TempDir;

/// A cache rooted in `temp_dir`, with `configure` applied to the defaults
pub(super) async fn test_cache(
    temp_dir: &TempDir,
    configure: impl FnOnce(CacheConfigBuilder) -> CacheConfigBuilder,
) -> Cache {
    let builder = CacheConfigBuilder::new().with_cache_dir(temp_dir.path().join("cache"));
    Cache::new(configure(builder).build()).await.unwrap()
}
