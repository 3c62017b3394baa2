//! Snapshot inspection commands — `drydock ls | cat | info`.
//!
//! These serve a saved snapshot file through the virtual repository store,
//! exercising exactly the read path the web backend uses. No network access:
//! the store is seeded from the file and the fetcher is disabled.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::sync::Arc;

use drydock::repo::VirtualRepo;
use drydock::snapshot::{
    DisabledFetcher, MemorySnapshotStore, RepoKey, RepositorySnapshot, SnapshotStore,
};

/// Load a snapshot file into a fresh in-memory store and open a virtual
/// repo over it.
async fn open_snapshot(path: &Path) -> Result<VirtualRepo> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
    let snapshot: RepositorySnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid snapshot file", path.display()))?;

    let key = RepoKey::parse(&snapshot.repo)?;
    let branch = snapshot.branch.clone();
    let store = Arc::new(MemorySnapshotStore::new());
    store.put(snapshot).await;

    Ok(VirtualRepo::new(key, &branch, store, Arc::new(DisabledFetcher)))
}

pub async fn cmd_ls(snapshot: &Path, pattern: Option<&str>) -> Result<()> {
    let repo = open_snapshot(snapshot).await?;
    let files = repo.list_files(pattern).await;
    if files.is_empty() {
        println!("No files{}", pattern.map(|p| format!(" matching {}", p)).unwrap_or_default());
        return Ok(());
    }
    for path in &files {
        println!("{}", path);
    }
    println!("\n{} file(s)", style(files.len()).bold());
    Ok(())
}

pub async fn cmd_cat(snapshot: &Path, file: &str) -> Result<()> {
    let repo = open_snapshot(snapshot).await?;
    match repo.get_file_content(file).await {
        Some(content) => {
            println!("{}", content);
            Ok(())
        }
        None => anyhow::bail!("{} not found in snapshot", file),
    }
}

pub async fn cmd_info(snapshot: &Path, file: Option<&str>) -> Result<()> {
    let repo = open_snapshot(snapshot).await?;

    match file {
        Some(path) => {
            let meta = repo
                .get_file_metadata(path)
                .await
                .with_context(|| format!("{} not found in snapshot", path))?;
            println!("Path:     {}", meta.path);
            println!("Name:     {}", meta.name);
            println!("Size:     {} bytes", meta.size);
            println!("Language: {}", meta.language.as_deref().unwrap_or("unknown"));
            println!("Tracked:  {}", meta.is_tracked);
        }
        None => {
            let files = repo.list_files(None).await;
            println!("Repository: {}", style(repo.key()).cyan());
            println!("Branch:     {}", repo.branch());
            println!("Files:      {}", files.len());
        }
    }
    Ok(())
}
