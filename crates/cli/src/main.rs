use clap::Parser;
use hoard_cache::{Cache, CacheConfigLoader, CachePreset};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

mod commands;
mod logging;

use commands::Commands;

#[derive(Parser)]
#[command(name = "hoard")]
#[command(about = "Persistent key-value cache with expiration and tagging", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration preset (default, short-term, long-term, permanent, image)
    #[arg(long, global = true, default_value = "default")]
    preset: CachePreset,

    /// Cache directory, overriding the config file and environment
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Read configuration from this JSON file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    logging::init()?;

    let cli = Cli::parse();

    let configuration = CacheConfigLoader::load_from(cli.preset, cli.config.as_deref())?;
    let configuration = CacheConfigLoader::apply_cli_args(configuration, cli.dir)?;
    debug!(source = ?configuration.source, root = %configuration.cache.cache_root().display(), "Loaded cache configuration");

    let cache = Arc::new(Cache::new(configuration.cache).await?);
    let mut stdout = std::io::stdout().lock();
    cli.command.execute(cache, &mut stdout).await
}
