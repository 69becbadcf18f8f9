use anyhow::Context;
use clap::Parser;
use prompt_workbench::config::Config;
use prompt_workbench::controllers::SystemClipboard;
use prompt_workbench::service::HttpPromptService;
use prompt_workbench::storage::{FileSystemStore, KeyValueStore, MemoryStore};
use prompt_workbench::{repl, Workbench};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/prompt-workbench/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the enhancement service API
    #[arg(long)]
    api_base: Option<String>,

    /// Directory for the persisted prompt history
    #[arg(long)]
    history_dir: Option<PathBuf>,

    /// Keep history in memory only; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Use `RUST_LOG=info` (or debug, trace, etc.) to control log level.
    // Logs go to stderr so they don't interleave with the session on stdout.
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    tracing::info!(args = ?args, "Starting prompt workbench");

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(api_base) = args.api_base {
        config.api_base = api_base;
    }
    if let Some(history_dir) = args.history_dir {
        config.history_dir = Some(history_dir);
    }

    let backend: Arc<dyn KeyValueStore> = if args.ephemeral {
        tracing::info!("Using in-memory history");
        Arc::new(MemoryStore::new())
    } else {
        let dir = config.history_dir();
        tracing::info!(path = %dir.display(), "Using filesystem history");
        Arc::new(FileSystemStore::new(dir))
    };

    let service = HttpPromptService::new(config.api_base.clone(), config.request_timeout())
        .context("Failed to build HTTP client")?;
    tracing::info!(api_base = %config.api_base, "Using enhancement service");

    let workbench = Workbench::new(
        &config,
        Arc::new(service),
        backend,
        Arc::new(SystemClipboard),
    );
    repl::run(workbench).await
}
