//! packsync command-line uploader.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use packsync_uploader::{UploadClient, UploadKind, UploadOutcome, UploadResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "packsync")]
#[command(about = "Upload modpack recipe and icon data to the packsync service")]
struct Cli {
    /// Config file path (default: ~/.config/packsync/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether an upload already exists on the server
    Check {
        /// Modpack version
        #[arg(long)]
        version: String,
        /// Upload kind: recipes or icons
        #[arg(long)]
        kind: UploadKind,
    },
    /// Upload a serialized recipe document
    UploadRecipes {
        /// Modpack version
        #[arg(long)]
        version: String,
        /// Recipe document to upload
        file: PathBuf,
        /// Upload even if the server already has this version
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Pack an icon directory with its metadata and upload it
    UploadIcons {
        /// Modpack version
        #[arg(long)]
        version: String,
        /// Directory holding the icon files
        #[arg(long)]
        dir: PathBuf,
        /// JSON metadata document describing the icons
        #[arg(long)]
        metadata: PathBuf,
        /// Upload even if the server already has this version
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let client = UploadClient::new(config.client_config()).context("invalid configuration")?;

    match cli.command {
        Commands::Check { version, kind } => {
            let exists = client.exists(&version, kind).await;
            println!("{}", if exists { "exists" } else { "missing" });
            Ok(())
        }
        Commands::UploadRecipes {
            version,
            file,
            force,
        } => upload_recipes(&client, &version, &file, force).await,
        Commands::UploadIcons {
            version,
            dir,
            metadata,
            force,
        } => upload_icons(&client, &version, &dir, &metadata, force).await,
    }
}

fn log_progress(current: u64, total: u64, message: &str) {
    info!(current, total, "{message}");
}

async fn upload_recipes(
    client: &UploadClient,
    version: &str,
    file: &Path,
    force: bool,
) -> Result<()> {
    let result = if force {
        let payload = std::fs::read(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        client.upload_recipes(version, &payload, &log_progress).await
    } else {
        let outcome = client
            .upload_if_missing(
                version,
                UploadKind::Recipes,
                || std::fs::read(file),
                &log_progress,
            )
            .await;
        match outcome {
            UploadOutcome::Skipped => {
                println!("recipes for {version} already uploaded");
                return Ok(());
            }
            UploadOutcome::Uploaded(result) => result,
        }
    };
    report(result)
}

async fn upload_icons(
    client: &UploadClient,
    version: &str,
    dir: &Path,
    metadata: &Path,
    force: bool,
) -> Result<()> {
    if !force && client.exists(version, UploadKind::Icons).await {
        println!("icons for {version} already uploaded");
        return Ok(());
    }

    let metadata = std::fs::read(metadata)
        .with_context(|| format!("failed to read {}", metadata.display()))?;
    let files = packsync_icons::scan_icon_dir(dir)
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    info!(dir = %dir.display(), files = files.len(), "icon directory scanned");

    let result =
        packsync_icons::upload_icons(client, version, dir, metadata, files, &log_progress).await;
    report(result)
}

fn report(result: UploadResult) -> Result<()> {
    match result {
        UploadResult::Success {
            session_id,
            chunks_uploaded,
            bytes_uploaded,
        } => {
            println!(
                "uploaded {bytes_uploaded} bytes in {chunks_uploaded} chunks (session {session_id})"
            );
            Ok(())
        }
        UploadResult::Error { message, .. } => bail!("{message}"),
    }
}
