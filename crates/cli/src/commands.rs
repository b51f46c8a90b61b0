use clap::{Args, Subcommand};
use eyre::{bail, eyre, WrapErr};
use hoard_cache::{Cache, CancellationToken, CleanupScheduler, PutOptions, Ttl};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Store a string value
    Put {
        key: String,
        value: String,
        #[command(flatten)]
        ttl: TtlArgs,
        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Print a string value
    Get { key: String },
    /// Store the contents of a file
    PutFile {
        key: String,
        path: PathBuf,
        #[command(flatten)]
        ttl: TtlArgs,
    },
    /// Print the path of the blob holding a value
    GetFile { key: String },
    /// Remove an entry
    Rm { key: String },
    /// Remove every entry carrying a tag
    RmTag { tag: String },
    /// List keys, optionally filtered
    Keys {
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Print an entry's metadata as JSON
    Meta { key: String },
    /// Add tags to an entry
    Tag {
        key: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Make an entry expire this long from now
    Touch {
        key: String,
        /// New lifetime in milliseconds; must be positive
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        ttl_ms: u64,
    },
    /// Print cache statistics
    Stats,
    /// Remove expired entries once
    Sweep,
    /// Remove every entry
    Clear,
    /// Sweep expired entries periodically until interrupted
    Watch {
        /// Sweep interval; defaults to the configured cleanup interval
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[derive(Args)]
pub struct TtlArgs {
    /// Lifetime in milliseconds; the configured default applies when omitted.
    /// Must be positive, use --never for entries that do not expire
    #[arg(
        long,
        conflicts_with = "never",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    ttl_ms: Option<u64>,

    /// Never expire
    #[arg(long)]
    never: bool,
}

impl TtlArgs {
    fn ttl(&self) -> Ttl {
        match (self.never, self.ttl_ms) {
            (true, _) => Ttl::Never,
            (false, Some(ms)) => Ttl::After(Duration::from_millis(ms)),
            (false, None) => Ttl::Default,
        }
    }
}

impl Commands {
    pub async fn execute(self, cache: Arc<Cache>, out: &mut impl Write) -> eyre::Result<()> {
        match self {
            Commands::Put {
                key,
                value,
                ttl,
                tags,
            } => {
                let options = PutOptions::new().ttl(ttl.ttl()).tags(tags);
                if !cache.put_string_with(&key, &value, options).await {
                    bail!("failed to store '{key}'");
                }
            }
            Commands::Get { key } => {
                let value = cache
                    .get_string(&key)
                    .await
                    .ok_or_else(|| eyre!("no entry for '{key}'"))?;
                writeln!(out, "{value}")?;
            }
            Commands::PutFile { key, path, ttl } => {
                let mut file = tokio::fs::File::open(&path)
                    .await
                    .wrap_err_with(|| format!("failed to open {}", path.display()))?;
                if !cache.put_file(&key, &mut file, ttl.ttl()).await {
                    bail!("failed to store '{key}'");
                }
            }
            Commands::GetFile { key } => {
                let path = cache
                    .get_file(&key)
                    .await
                    .ok_or_else(|| eyre!("no entry for '{key}'"))?;
                writeln!(out, "{}", path.display())?;
            }
            Commands::Rm { key } => {
                cache.remove(&key).await;
            }
            Commands::RmTag { tag } => {
                let removed = cache.remove_by_tag(&tag).await;
                writeln!(out, "{removed}")?;
            }
            Commands::Keys { tag, prefix } => {
                let mut keys = match &tag {
                    Some(tag) => cache.get_keys_by_tag(tag).await,
                    None => cache.get_all_keys().await,
                };
                if let Some(prefix) = &prefix {
                    keys.retain(|key| key.starts_with(prefix.as_str()));
                }
                keys.sort();
                for key in keys {
                    writeln!(out, "{key}")?;
                }
            }
            Commands::Meta { key } => {
                let metadata = cache
                    .get_metadata(&key)
                    .await
                    .ok_or_else(|| eyre!("no entry for '{key}'"))?;
                writeln!(out, "{}", serde_json::to_string_pretty(&metadata)?)?;
            }
            Commands::Tag { key, tags } => {
                if !cache.add_tags(&key, tags).await {
                    bail!("no live entry for '{key}'");
                }
            }
            Commands::Touch { key, ttl_ms } => {
                if !cache
                    .refresh_expire_time(&key, Duration::from_millis(ttl_ms))
                    .await
                {
                    bail!("no entry for '{key}'");
                }
            }
            Commands::Stats => {
                let stats = cache.get_statistics().await;
                writeln!(out, "{stats}")?;
            }
            Commands::Sweep => {
                let cancel = CancellationToken::new();
                let removed = tokio::select! {
                    removed = cache.clear_expired_with(&cancel) => removed,
                    _ = tokio::signal::ctrl_c() => {
                        cancel.cancel();
                        bail!("sweep interrupted");
                    }
                };
                writeln!(out, "{removed}")?;
            }
            Commands::Clear => {
                if !cache.clear().await {
                    bail!("failed to clear the cache");
                }
            }
            Commands::Watch { interval_ms } => {
                let interval = interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| cache.config().cleanup_interval());
                if interval.is_zero() {
                    bail!("sweep interval must be positive");
                }

                let scheduler = CleanupScheduler::new(cache.clone());
                scheduler.schedule(interval);
                tokio::signal::ctrl_c()
                    .await
                    .wrap_err("failed to listen for Ctrl-C")?;

                scheduler.cancel();
                scheduler.join().await;
                let status = scheduler.status();
                info!(runs = status.runs, "Stopped watching cache");
                writeln!(out, "{}", status.runs)?;
            }
        }
        Ok(())
    }
}
