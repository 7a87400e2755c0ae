//! Command definitions and their implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use chronicle_core::{Config, Scheduler, SyncProcessor, WatchEvent, watch};
use chronicle_index::{CommitStore, IndexClient, SecretString};

use crate::repos;

#[derive(Parser)]
#[command(
    name = "chronicle",
    version,
    about = "Keeps a search index in sync with git commit history"
)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the collector daemon: sync every tracked repository, then
    /// keep sweeping at the configured interval.
    Run(SyncArgs),
    /// Sweep every tracked repository once and exit.
    Once(SyncArgs),
}

#[derive(Args)]
pub struct SyncArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "chronicle.toml")]
    pub config: PathBuf,

    /// Path to the tracked-repositories file.
    #[arg(short, long, default_value = "repos.toml")]
    pub repos: PathBuf,

    /// Override the working-copy directory.
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Override the index base URL.
    #[arg(long)]
    pub index_url: Option<String>,

    /// Override the per-sync commit limit (0 = unlimited).
    #[arg(long)]
    pub commit_limit: Option<u32>,

    /// Override the delay between sweeps, in milliseconds.
    #[arg(long)]
    pub sweep_interval_ms: Option<u64>,
}

/// Run the daemon: seed the registry from the repos file, drain the
/// resulting watch events, then sweep forever.
pub async fn run(args: SyncArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let scheduler = build_scheduler(&config)?;

    let (tx, rx) = mpsc::channel(32);
    for repo in repos::load(&args.repos)? {
        tx.send(WatchEvent::Added(repo)).await?;
    }
    drop(tx);
    let feed = tokio::spawn(watch::run_feed(rx, Arc::clone(&scheduler)));
    feed.await.context("watch feed task failed")?;

    info!(
        repositories = scheduler.registry().len(),
        interval_ms = config.sweep_interval_ms,
        "starting sweep loop"
    );
    scheduler.run_sweeps(config.sweep_interval()).await;
    Ok(())
}

/// Sync everything once, e.g. from cron or a CI job.
pub async fn once(args: SyncArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let scheduler = build_scheduler(&config)?;

    for repo in repos::load(&args.repos)? {
        scheduler.registry().upsert(repo);
    }

    let published = scheduler.sweep().await;
    info!(published, "single sweep finished");
    Ok(())
}

fn load_config(args: &SyncArgs) -> anyhow::Result<Config> {
    let mut config = Config::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    if let Some(work_dir) = &args.work_dir {
        config.work_dir.clone_from(work_dir);
    }
    if let Some(url) = &args.index_url {
        config.index.url.clone_from(url);
    }
    if let Some(limit) = args.commit_limit {
        config.commit_limit = limit;
    }
    if let Some(interval) = args.sweep_interval_ms {
        config.sweep_interval_ms = interval;
    }
    Ok(config)
}

fn build_scheduler(config: &Config) -> anyhow::Result<Arc<Scheduler<CommitStore>>> {
    let client = IndexClient::with_credentials(
        &config.index.url,
        config.index.username.clone(),
        config.index.password.clone().map(SecretString::from),
    )
    .context("failed to build index client")?;
    let store = CommitStore::with_scope(client, &config.index.index, &config.index.doc_type);
    let processor = SyncProcessor::new(store, config.work_dir.clone(), config.commit_limit);
    Ok(Arc::new(Scheduler::new(processor)))
}
