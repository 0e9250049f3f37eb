//! `mfisin` — maintain the local mutual fund ISIN database.
//!
//! # Usage
//!
//! ```
//! mfisin --version
//! mfisin --check
//! mfisin --update --config ~/.config/mfisin.toml
//! ```

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use mfisin_cli::{
  config::SyncConfig,
  sync::{DbSync, HttpSource, SyncStatus, UpdateCheck},
  version_report,
};
use mfisin_store_sqlite::MfIsinDb;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
  name = "mfisin",
  about = "ISIN lookup database for Indian mutual fund schemes",
  disable_version_flag = true
)]
struct Cli {
  /// Print the tool version and the local database version and format.
  #[arg(short = 'v', long)]
  version: bool,

  /// Download the published database if it is newer than the local one.
  #[arg(long, conflicts_with = "check")]
  update: bool,

  /// Exit with status 1 if a newer database is available.
  #[arg(long)]
  check: bool,

  /// Path to a TOML config file (meta_url, db_url, timeout_secs, db_path).
  #[arg(short, long, value_name = "FILE", default_value = "mfisin.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if !(cli.version || cli.update || cli.check) {
    Cli::command().print_help()?;
    return Ok(ExitCode::SUCCESS);
  }

  let config = SyncConfig::load(&cli.config).context("failed to read config")?;
  let db_path = config.db_path();

  if cli.version {
    let meta = MfIsinDb::open(&db_path)
      .metadata()
      .with_context(|| format!("failed to read metadata from {}", db_path.display()))?;
    print!("{}", version_report(&meta));
  }

  let sync = DbSync::new(HttpSource::new(&config)?, &db_path);

  if cli.update {
    match sync.sync().await? {
      SyncStatus::Updated { version } => {
        tracing::debug!(%version, path = %db_path.display(), "store replaced");
      }
      SyncStatus::AlreadyCurrent => {}
      SyncStatus::FetchFailed(reason) => tracing::warn!("update skipped: {reason}"),
    }
  }

  if cli.check {
    match sync.check().await? {
      UpdateCheck::UpdateAvailable { local, remote } => {
        println!("A newer database is available ({} -> {}).", local.version, remote.version);
        println!("To update the database, re-run the command with --update flag.");
        return Ok(ExitCode::from(1));
      }
      UpdateCheck::UpToDate => println!("Local database is up to date."),
      UpdateCheck::FetchFailed(reason) => tracing::warn!("update check skipped: {reason}"),
    }
  }

  Ok(ExitCode::SUCCESS)
}
