//! Snapshot fetch command — `drydock fetch`.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::sync::Arc;

use drydock::config::DrydockConfig;
use drydock::snapshot::{EnvTokenProvider, GithubFetcher, RepoKey, SnapshotFetcher};

/// Run the fetch job for one repo+branch and save the snapshot as JSON.
pub async fn cmd_fetch(
    config: &DrydockConfig,
    repo: &str,
    branch: &str,
    output: &Path,
) -> Result<()> {
    let key = RepoKey::parse(repo)?;
    let fetcher = GithubFetcher::new(config.fetch.clone(), Arc::new(EnvTokenProvider));

    println!(
        "Fetching {} (branch {}) ...",
        style(key.slug()).cyan(),
        style(branch).cyan()
    );

    let snapshot = fetcher
        .fetch(&key, branch)
        .await
        .with_context(|| format!("Could not fetch a snapshot of {}", key.slug()))?;

    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write snapshot to {}", output.display()))?;

    println!(
        "{} snapshot saved to {} ({} estimated tokens)",
        style("✓").green(),
        output.display(),
        snapshot.metadata.estimated_tokens
    );
    Ok(())
}
