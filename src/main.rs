use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

use drydock::config::DrydockConfig;

#[derive(Parser)]
#[command(name = "drydock")]
#[command(
    version,
    about = "Snapshot-backed repository store and assistant response processor"
)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory containing drydock.toml (defaults to the current directory)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a repository branch from GitHub and save it as a snapshot file
    Fetch {
        /// Repository slug in owner/name form
        repo: String,

        #[arg(short, long, default_value = "main")]
        branch: String,

        /// Where to write the snapshot JSON
        #[arg(short, long, default_value = "snapshot.json")]
        output: PathBuf,
    },
    /// List the files recorded in a snapshot
    Ls {
        /// Path to a snapshot file produced by `fetch`
        snapshot: PathBuf,

        /// Glob filter, e.g. "src/**/*.rs"
        #[arg(short, long)]
        pattern: Option<String>,
    },
    /// Print one file's content from a snapshot
    Cat {
        snapshot: PathBuf,

        /// Repository-relative file path
        file: String,
    },
    /// Show a snapshot summary, or metadata for a single file
    Info {
        snapshot: PathBuf,

        /// Show metadata for this file instead of the snapshot summary
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Structure an assistant response transcript into JSON
    Process {
        /// Transcript file, or `-` to read from stdin
        transcript: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let config_dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = DrydockConfig::load(&config_dir)?;
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    match &cli.command {
        Commands::Fetch {
            repo,
            branch,
            output,
        } => {
            cmd::cmd_fetch(&config, repo, branch, output).await?;
        }
        Commands::Ls { snapshot, pattern } => {
            cmd::cmd_ls(snapshot, pattern.as_deref()).await?;
        }
        Commands::Cat { snapshot, file } => {
            cmd::cmd_cat(snapshot, file).await?;
        }
        Commands::Info { snapshot, file } => {
            cmd::cmd_info(snapshot, file.as_deref()).await?;
        }
        Commands::Process { transcript } => {
            cmd::cmd_process(transcript)?;
        }
    }

    Ok(())
}
