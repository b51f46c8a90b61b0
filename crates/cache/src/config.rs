//! Cache configuration management with presets, precedence and validation

use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const MB: u64 = 1024 * 1024;
const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Immutable configuration for one cache instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Parent directory for `root_dir_name`
    pub base_dir: PathBuf,
    /// Directory name under `base_dir`, or an absolute path that replaces it
    pub root_dir_name: String,
    /// Default lifetime in milliseconds; zero or negative never expires
    pub default_expire_ms: i64,
    /// Advisory total size limit in bytes; zero disables the check
    pub max_cache_size: u64,
    /// Keep recently read values in memory
    pub enable_memory_cache: bool,
    /// Capacity of the memory layer
    pub memory_cache_max_entries: usize,
    /// Whether a periodic sweeper should run for this cache
    pub auto_clean_expired: bool,
    /// Sweeper interval in milliseconds
    pub cleanup_interval_ms: u64,
    /// Reserved; payloads are always stored in plaintext
    pub enable_encryption: bool,
    /// Reserved; never applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            root_dir_name: "app_cache".to_string(),
            default_expire_ms: 7 * DAY_MS,
            max_cache_size: 100 * MB,
            enable_memory_cache: true,
            memory_cache_max_entries: 1000,
            auto_clean_expired: true,
            cleanup_interval_ms: HOUR_MS as u64,
            enable_encryption: false,
            encryption_key: None,
        }
    }
}

impl CacheConfig {
    /// Short-lived data: one hour
    pub fn short_term() -> Self {
        Self {
            root_dir_name: "short_cache".to_string(),
            default_expire_ms: HOUR_MS,
            ..Self::default()
        }
    }

    /// Long-lived data: thirty days
    pub fn long_term() -> Self {
        Self {
            root_dir_name: "long_cache".to_string(),
            default_expire_ms: 30 * DAY_MS,
            ..Self::default()
        }
    }

    /// Entries never expire and no sweeper is wanted
    pub fn permanent() -> Self {
        Self {
            root_dir_name: "permanent_cache".to_string(),
            default_expire_ms: -1,
            auto_clean_expired: false,
            ..Self::default()
        }
    }

    /// Larger payloads: fourteen days, 200 MB
    pub fn image() -> Self {
        Self {
            root_dir_name: "image_cache".to_string(),
            default_expire_ms: 14 * DAY_MS,
            max_cache_size: 200 * MB,
            enable_memory_cache: true,
            ..Self::default()
        }
    }

    /// Configuration for a named preset
    pub fn preset(preset: CachePreset) -> Self {
        match preset {
            CachePreset::Default => Self::default(),
            CachePreset::ShortTerm => Self::short_term(),
            CachePreset::LongTerm => Self::long_term(),
            CachePreset::Permanent => Self::permanent(),
            CachePreset::Image => Self::image(),
        }
    }

    /// Resolved root directory of the cache
    pub fn cache_root(&self) -> PathBuf {
        let name = Path::new(&self.root_dir_name);
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.base_dir.join(name)
        }
    }

    /// Default lifetime, `None` when entries never expire by default
    pub fn default_ttl(&self) -> Option<Duration> {
        u64::try_from(self.default_expire_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Sweeper interval as a duration
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Advisory size limit, `None` when unlimited
    pub fn size_limit(&self) -> Option<u64> {
        (self.max_cache_size > 0).then_some(self.max_cache_size)
    }

    /// Reject combinations the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.root_dir_name.trim().is_empty() {
            return Err(configuration_error(
                "root_dir_name must not be empty",
                "Set root_dir_name to a directory name or absolute path",
            ));
        }
        if self.enable_memory_cache && self.memory_cache_max_entries == 0 {
            return Err(configuration_error(
                "memory_cache_max_entries must be positive when the memory cache is enabled",
                "Disable the memory cache or raise memory_cache_max_entries",
            ));
        }
        if self.auto_clean_expired && self.cleanup_interval_ms == 0 {
            return Err(configuration_error(
                "cleanup_interval_ms must be positive when auto_clean_expired is set",
                "Disable auto_clean_expired or set a cleanup interval",
            ));
        }
        Ok(())
    }
}

fn default_base_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hoard")
}

fn configuration_error(message: &str, instructions: &str) -> CacheError {
    CacheError::Configuration {
        message: message.to_string(),
        recovery_hint: RecoveryHint::Manual {
            instructions: instructions.to_string(),
        },
    }
}

/// Named configuration presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePreset {
    #[default]
    Default,
    ShortTerm,
    LongTerm,
    Permanent,
    Image,
}

impl CachePreset {
    pub const ALL: [CachePreset; 5] = [
        Self::Default,
        Self::ShortTerm,
        Self::LongTerm,
        Self::Permanent,
        Self::Image,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
            Self::Permanent => "permanent",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for CachePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CachePreset {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "default" | "app" => Ok(Self::Default),
            "short_term" | "short" => Ok(Self::ShortTerm),
            "long_term" | "long" => Ok(Self::LongTerm),
            "permanent" => Ok(Self::Permanent),
            "image" | "image_cache" => Ok(Self::Image),
            other => Err(CacheError::Configuration {
                message: format!("unknown cache preset '{other}'"),
                recovery_hint: RecoveryHint::UseDefault {
                    value: CachePreset::Default.to_string(),
                },
            }),
        }
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Preset defaults
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
    /// Command line argument
    CommandLine,
}

/// Configuration together with the highest-precedence source that touched it
#[derive(Debug, Clone)]
pub struct CacheConfiguration {
    pub cache: CacheConfig,
    pub source: ConfigSource,
}

/// Builder for creating cache configurations
#[derive(Debug, Clone, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a preset instead of the defaults
    pub fn from_preset(preset: CachePreset) -> Self {
        Self {
            config: CacheConfig::preset(preset),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = base_dir.into();
        self
    }

    pub fn with_root_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.root_dir_name = name.into();
        self
    }

    /// Place the cache at exactly this directory
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        match (dir.parent(), dir.file_name()) {
            (Some(parent), Some(name)) => {
                self.config.base_dir = parent.to_path_buf();
                self.config.root_dir_name = name.to_string_lossy().into_owned();
            }
            _ => self.config.root_dir_name = dir.to_string_lossy().into_owned(),
        }
        self
    }

    /// Default lifetime; `None` never expires
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.config.default_expire_ms = match ttl {
            Some(ttl) => i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            None => -1,
        };
        self
    }

    pub fn with_max_cache_size(mut self, bytes: u64) -> Self {
        self.config.max_cache_size = bytes;
        self
    }

    pub fn with_memory_cache(mut self, enabled: bool) -> Self {
        self.config.enable_memory_cache = enabled;
        self
    }

    pub fn with_memory_cache_max_entries(mut self, entries: usize) -> Self {
        self.config.memory_cache_max_entries = entries;
        self
    }

    pub fn with_auto_clean(mut self, enabled: bool) -> Self {
        self.config.auto_clean_expired = enabled;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cleanup_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_encryption(mut self, enabled: bool, key: Option<String>) -> Self {
        self.config.enable_encryption = enabled;
        self.config.encryption_key = key;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// Partial configuration read from a file or the environment
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheOverrides {
    base_dir: Option<PathBuf>,
    root_dir_name: Option<String>,
    default_expire_ms: Option<i64>,
    max_cache_size: Option<u64>,
    enable_memory_cache: Option<bool>,
    memory_cache_max_entries: Option<usize>,
    auto_clean_expired: Option<bool>,
    cleanup_interval_ms: Option<u64>,
    enable_encryption: Option<bool>,
    encryption_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    cache: CacheOverrides,
}

impl CacheOverrides {
    fn is_empty(&self) -> bool {
        self.base_dir.is_none()
            && self.root_dir_name.is_none()
            && self.default_expire_ms.is_none()
            && self.max_cache_size.is_none()
            && self.enable_memory_cache.is_none()
            && self.memory_cache_max_entries.is_none()
            && self.auto_clean_expired.is_none()
            && self.cleanup_interval_ms.is_none()
            && self.enable_encryption.is_none()
            && self.encryption_key.is_none()
    }

    fn apply(self, config: &mut CacheConfig) {
        if let Some(base_dir) = self.base_dir {
            config.base_dir = base_dir;
        }
        if let Some(name) = self.root_dir_name {
            config.root_dir_name = name;
        }
        if let Some(ms) = self.default_expire_ms {
            config.default_expire_ms = ms;
        }
        if let Some(size) = self.max_cache_size {
            config.max_cache_size = size;
        }
        if let Some(enabled) = self.enable_memory_cache {
            config.enable_memory_cache = enabled;
        }
        if let Some(entries) = self.memory_cache_max_entries {
            config.memory_cache_max_entries = entries;
        }
        if let Some(enabled) = self.auto_clean_expired {
            config.auto_clean_expired = enabled;
        }
        if let Some(ms) = self.cleanup_interval_ms {
            config.cleanup_interval_ms = ms;
        }
        if let Some(enabled) = self.enable_encryption {
            config.enable_encryption = enabled;
        }
        if self.encryption_key.is_some() {
            config.encryption_key = self.encryption_key;
        }
    }
}

/// Environment variables read by [`CacheConfigLoader`]
pub mod env {
    pub const CACHE_DIR: &str = "HOARD_CACHE_DIR";
    pub const DEFAULT_TTL_MS: &str = "HOARD_CACHE_DEFAULT_TTL_MS";
    pub const MAX_SIZE: &str = "HOARD_CACHE_MAX_SIZE";
    pub const MEMORY: &str = "HOARD_CACHE_MEMORY";
    pub const MEMORY_ENTRIES: &str = "HOARD_CACHE_MEMORY_ENTRIES";
    pub const AUTO_CLEAN: &str = "HOARD_CACHE_AUTO_CLEAN";
    pub const CLEANUP_INTERVAL_MS: &str = "HOARD_CACHE_CLEANUP_INTERVAL_MS";
}

/// Configuration loader that handles precedence
pub struct CacheConfigLoader;

impl CacheConfigLoader {
    /// Load configuration for a preset from the default config file and the environment
    pub fn load(preset: CachePreset) -> Result<CacheConfiguration> {
        Self::load_from(preset, None)
    }

    /// Load configuration, reading `config_file` instead of the default location when given
    pub fn load_from(preset: CachePreset, config_file: Option<&Path>) -> Result<CacheConfiguration> {
        let mut configuration = CacheConfiguration {
            cache: CacheConfig::preset(preset),
            source: ConfigSource::Default,
        };

        let path = match config_file {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_file_path()?,
        };
        if let Some(overrides) = Self::load_from_config_file(&path, config_file.is_some())? {
            overrides.apply(&mut configuration.cache);
            configuration.source = ConfigSource::ConfigFile(path);
        }

        let (overrides, vars) = Self::load_from_env()?;
        if !overrides.is_empty() {
            overrides.apply(&mut configuration.cache);
            configuration.source = ConfigSource::EnvironmentVariable(vars.join(","));
        }

        configuration.cache.validate()?;
        Ok(configuration)
    }

    /// Apply command line arguments (highest precedence)
    pub fn apply_cli_args(
        mut configuration: CacheConfiguration,
        cache_dir: Option<PathBuf>,
    ) -> Result<CacheConfiguration> {
        if let Some(dir) = cache_dir {
            configuration.cache = CacheConfigBuilder {
                config: configuration.cache,
            }
            .with_cache_dir(absolutize(dir)?)
            .build();
            configuration.source = ConfigSource::CommandLine;
        }
        configuration.cache.validate()?;
        Ok(configuration)
    }

    fn load_from_config_file(path: &Path, required: bool) -> Result<Option<CacheOverrides>> {
        if !path.exists() {
            if required {
                return Err(CacheError::Configuration {
                    message: format!("config file '{}' does not exist", path.display()),
                    recovery_hint: RecoveryHint::CheckPermissions {
                        path: path.to_path_buf(),
                    },
                });
            }
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            operation: "read config file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        })?;

        let file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| CacheError::Serialization {
                key: path.display().to_string(),
                operation: SerializationOp::Decode,
                source: e,
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Check config file syntax".to_string(),
                },
            })?;

        Ok(Some(file.cache))
    }

    fn load_from_env() -> Result<(CacheOverrides, Vec<String>)> {
        let mut overrides = CacheOverrides::default();
        let mut vars = Vec::new();

        if let Ok(dir) = std::env::var(env::CACHE_DIR) {
            let dir = absolutize(PathBuf::from(dir))?;
            let config = CacheConfigBuilder::new().with_cache_dir(&dir).build();
            overrides.base_dir = Some(config.base_dir);
            overrides.root_dir_name = Some(config.root_dir_name);
            vars.push(env::CACHE_DIR.to_string());
        }
        if let Some(ms) = parse_env::<i64>(env::DEFAULT_TTL_MS)? {
            overrides.default_expire_ms = Some(ms);
            vars.push(env::DEFAULT_TTL_MS.to_string());
        }
        if let Some(size) = parse_env::<u64>(env::MAX_SIZE)? {
            overrides.max_cache_size = Some(size);
            vars.push(env::MAX_SIZE.to_string());
        }
        if let Some(enabled) = parse_env_bool(env::MEMORY)? {
            overrides.enable_memory_cache = Some(enabled);
            vars.push(env::MEMORY.to_string());
        }
        if let Some(entries) = parse_env::<usize>(env::MEMORY_ENTRIES)? {
            overrides.memory_cache_max_entries = Some(entries);
            vars.push(env::MEMORY_ENTRIES.to_string());
        }
        if let Some(enabled) = parse_env_bool(env::AUTO_CLEAN)? {
            overrides.auto_clean_expired = Some(enabled);
            vars.push(env::AUTO_CLEAN.to_string());
        }
        if let Some(ms) = parse_env::<u64>(env::CLEANUP_INTERVAL_MS)? {
            overrides.cleanup_interval_ms = Some(ms);
            vars.push(env::CLEANUP_INTERVAL_MS.to_string());
        }

        Ok((overrides, vars))
    }

    /// Get the configuration file path
    pub fn get_config_file_path() -> Result<PathBuf> {
        let config_dir = if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config_home)
        } else {
            dirs::config_dir().ok_or_else(|| CacheError::Configuration {
                message: "Could not determine config directory".to_string(),
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Set XDG_CONFIG_HOME or HOME environment variable".to_string(),
                },
            })?
        };

        Ok(config_dir.join("hoard").join("config.json"))
    }
}

fn absolutize(dir: PathBuf) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir);
    }
    let cwd = std::env::current_dir().map_err(|e| CacheError::io(".", "resolve current directory", e))?;
    Ok(cwd.join(dir))
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| CacheError::Configuration {
            message: format!("{name} has an invalid value '{raw}'"),
            recovery_hint: RecoveryHint::Manual {
                instructions: format!("Unset {name} or give it a numeric value"),
            },
        }),
        Err(_) => Ok(None),
    }
}

fn parse_env_bool(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(CacheError::Configuration {
                message: format!("{name} has an invalid value '{raw}'"),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "true".to_string(),
                },
            }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for var in [
            env::CACHE_DIR,
            env::DEFAULT_TTL_MS,
            env::MAX_SIZE,
            env::MEMORY,
            env::MEMORY_ENTRIES,
            env::AUTO_CLEAN,
            env::CLEANUP_INTERVAL_MS,
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_presets() {
        let default = CacheConfig::default();
        assert_eq!(default.root_dir_name, "app_cache");
        assert_eq!(default.default_ttl(), Some(Duration::from_secs(7 * 24 * 3600)));
        assert_eq!(default.max_cache_size, 100 * MB);
        assert!(default.enable_memory_cache);
        assert_eq!(default.memory_cache_max_entries, 1000);
        assert_eq!(default.cleanup_interval(), Duration::from_secs(3600));

        assert_eq!(CacheConfig::short_term().default_ttl(), Some(Duration::from_secs(3600)));
        assert_eq!(
            CacheConfig::long_term().default_ttl(),
            Some(Duration::from_secs(30 * 24 * 3600))
        );

        let permanent = CacheConfig::permanent();
        assert_eq!(permanent.default_ttl(), None);
        assert!(!permanent.auto_clean_expired);

        let image = CacheConfig::image();
        assert_eq!(image.max_cache_size, 200 * MB);
        assert_eq!(image.root_dir_name, "image_cache");
    }

    #[test]
    fn test_preset_parsing() {
        for preset in CachePreset::ALL {
            assert_eq!(preset.as_str().parse::<CachePreset>().unwrap(), preset);
        }
        assert_eq!("short-term".parse::<CachePreset>().unwrap(), CachePreset::ShortTerm);
        assert!("bogus".parse::<CachePreset>().is_err());
    }

    #[test]
    fn test_cache_config_builder() {
        let temp_dir = TempDir::new().unwrap();
        let config = CacheConfigBuilder::from_preset(CachePreset::ShortTerm)
            .with_cache_dir(temp_dir.path().join("c"))
            .with_default_ttl(None)
            .with_memory_cache_max_entries(3)
            .build();

        assert_eq!(config.cache_root(), temp_dir.path().join("c"));
        assert_eq!(config.default_expire_ms, -1);
        assert_eq!(config.memory_cache_max_entries, 3);
    }

    #[test]
    fn test_absolute_root_dir_name_overrides_base() {
        let config = CacheConfigBuilder::new()
            .with_base_dir("/ignored")
            .with_root_dir_name("/var/tmp/hoard-test")
            .build();
        assert_eq!(config.cache_root(), PathBuf::from("/var/tmp/hoard-test"));
    }

    #[test]
    fn test_validate_rejects_zero_capacity_and_interval() {
        let config = CacheConfigBuilder::new().with_memory_cache_max_entries(0).build();
        assert!(matches!(config.validate(), Err(CacheError::Configuration { .. })));

        let config = CacheConfigBuilder::new()
            .with_memory_cache(false)
            .with_memory_cache_max_entries(0)
            .build();
        assert!(config.validate().is_ok());

        let config = CacheConfigBuilder::new()
            .with_cleanup_interval(Duration::ZERO)
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_config_file_loading() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.json");
        std::fs::write(
            &config_file,
            r#"{ "cache": { "default_expire_ms": 5000, "enable_memory_cache": false } }"#,
        )
        .unwrap();

        let loaded = CacheConfigLoader::load_from(CachePreset::LongTerm, Some(&config_file)).unwrap();
        assert_eq!(loaded.cache.default_expire_ms, 5000);
        assert!(!loaded.cache.enable_memory_cache);
        assert_eq!(loaded.cache.root_dir_name, "long_cache");
        assert_eq!(loaded.source, ConfigSource::ConfigFile(config_file));
    }

    #[test]
    #[serial]
    fn test_missing_explicit_config_file_is_an_error() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.json");
        assert!(CacheConfigLoader::load_from(CachePreset::Default, Some(&missing)).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.json");
        std::fs::write(&config_file, r#"{ "cache": { "default_expire_ms": 5000 } }"#).unwrap();

        std::env::set_var(env::DEFAULT_TTL_MS, "-1");
        std::env::set_var(env::MEMORY_ENTRIES, "7");
        std::env::set_var(env::CACHE_DIR, temp_dir.path().join("envcache"));

        let loaded = CacheConfigLoader::load_from(CachePreset::Default, Some(&config_file)).unwrap();
        clear_env();

        assert_eq!(loaded.cache.default_ttl(), None);
        assert_eq!(loaded.cache.memory_cache_max_entries, 7);
        assert_eq!(loaded.cache.cache_root(), temp_dir.path().join("envcache"));
        assert!(matches!(loaded.source, ConfigSource::EnvironmentVariable(_)));
    }

    #[test]
    #[serial]
    fn test_invalid_env_value_is_rejected() {
        clear_env();
        std::env::set_var(env::MAX_SIZE, "lots");
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.json");
        std::fs::write(&config_file, "{}").unwrap();

        let result = CacheConfigLoader::load_from(CachePreset::Default, Some(&config_file));
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_cli_args_take_precedence() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.json");
        std::fs::write(&config_file, "{}").unwrap();

        let loaded = CacheConfigLoader::load_from(CachePreset::Default, Some(&config_file)).unwrap();
        let applied =
            CacheConfigLoader::apply_cli_args(loaded, Some(temp_dir.path().join("cli"))).unwrap();
        assert_eq!(applied.cache.cache_root(), temp_dir.path().join("cli"));
        assert_eq!(applied.source, ConfigSource::CommandLine);
    }
}
