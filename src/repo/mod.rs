//! The virtual repository store.
//!
//! `VirtualRepo` presents a read-only, checkout-shaped view of one
//! repository branch — file listing, per-file content, metadata, and a
//! structural overview — sourced entirely from a cached snapshot. No call
//! touches a real filesystem or the network except the one lazy snapshot
//! fetch on first use against a cold store.
//!
//! Failure semantics are deliberate: a repository whose snapshot cannot be
//! obtained answers every lookup with "not found" (`None`/empty), never an
//! error. Callers decide whether that is worth surfacing.

pub mod content;
pub mod language;
pub mod path;
pub mod tree;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

use crate::snapshot::{RepoKey, RepositorySnapshot, SnapshotFetcher, SnapshotStore};
use path::{file_name, normalize_path};

/// Derived per-file metadata. Recomputed from the snapshot on lookup and
/// memoized for the lifetime of one `VirtualRepo` instance; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub path: String,
    pub name: String,
    /// UTF-8 byte length of the file's content.
    pub size: u64,
    pub language: Option<String>,
    /// All files enumerated by the tree listing are tracked.
    pub is_tracked: bool,
}

/// Read-only view of one repository branch backed by the snapshot store.
pub struct VirtualRepo {
    key: RepoKey,
    branch: String,
    store: Arc<dyn SnapshotStore>,
    fetcher: Arc<dyn SnapshotFetcher>,
    /// Memoized snapshot lookup; `None` inside means the fetch failed and
    /// this instance will answer "not found" for everything.
    snapshot: OnceCell<Option<Arc<RepositorySnapshot>>>,
    /// Memoized tree parse.
    files: OnceCell<Vec<String>>,
    metadata: RwLock<HashMap<String, FileMetadata>>,
}

impl VirtualRepo {
    pub fn new(
        key: RepoKey,
        branch: &str,
        store: Arc<dyn SnapshotStore>,
        fetcher: Arc<dyn SnapshotFetcher>,
    ) -> Self {
        Self {
            key,
            branch: branch.to_string(),
            store,
            fetcher,
            snapshot: OnceCell::new(),
            files: OnceCell::new(),
            metadata: RwLock::new(HashMap::new()),
        }
    }

    pub fn key(&self) -> &RepoKey {
        &self.key
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Resolve the snapshot, fetching and storing it on a cold cache.
    /// At most one fetch attempt per instance; a failed attempt is memoized
    /// so repeated lookups do not hammer a broken upstream.
    async fn snapshot(&self) -> Option<Arc<RepositorySnapshot>> {
        self.snapshot
            .get_or_init(|| async {
                if let Some(cached) = self.store.get(&self.key, &self.branch).await {
                    return Some(cached);
                }
                tracing::debug!(repo = %self.key, branch = %self.branch, "Snapshot cache miss; fetching");
                match self.fetcher.fetch(&self.key, &self.branch).await {
                    Ok(snapshot) => {
                        self.store.put(snapshot).await;
                        self.store.get(&self.key, &self.branch).await
                    }
                    Err(err) => {
                        tracing::warn!(repo = %self.key, branch = %self.branch, error = %err, "Snapshot unavailable");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// True when a snapshot is (or becomes) available.
    pub async fn ensure_snapshot(&self) -> bool {
        self.snapshot().await.is_some()
    }

    /// All file paths in the snapshot, optionally filtered by a glob
    /// pattern. Empty on an unavailable snapshot.
    pub async fn list_files(&self, pattern: Option<&str>) -> Vec<String> {
        let all = self
            .files
            .get_or_init(|| async {
                match self.snapshot().await {
                    Some(snapshot) => tree::parse_tree(&snapshot.tree),
                    None => Vec::new(),
                }
            })
            .await;

        match pattern.and_then(|p| glob::Pattern::new(p).ok()) {
            Some(glob) => all
                .iter()
                .filter(|path| glob.matches(path))
                .cloned()
                .collect(),
            None => all.clone(),
        }
    }

    /// One file's content, or `None` when the path or snapshot is unknown.
    pub async fn get_file_content(&self, path: &str) -> Option<String> {
        let snapshot = self.snapshot().await?;
        content::extract_file(&snapshot.content, path)
    }

    /// Derived metadata for one file.
    pub async fn get_file_metadata(&self, path: &str) -> Option<FileMetadata> {
        let path = normalize_path(path);
        if let Some(cached) = self.metadata.read().await.get(&path) {
            return Some(cached.clone());
        }

        let content = self.get_file_content(&path).await?;
        let tracked = self.list_files(None).await.iter().any(|p| *p == path);
        let meta = FileMetadata {
            name: file_name(&path),
            size: content.len() as u64,
            language: language::language_for_path(&path).map(str::to_string),
            is_tracked: tracked,
            path: path.clone(),
        };
        self.metadata.write().await.insert(path, meta.clone());
        Some(meta)
    }

    /// A compact structural overview: tree preview plus the head of the
    /// content blob. Used as prompt grounding when no context files are set.
    pub async fn overview(&self, tree_lines: usize, content_chars: usize) -> Option<String> {
        let snapshot = self.snapshot().await?;

        let mut out = format!("Repository: {} (branch {})\n\nStructure:\n", self.key, self.branch);
        for line in snapshot.tree.lines().take(tree_lines) {
            out.push_str(line);
            out.push('\n');
        }
        if snapshot.tree.lines().count() > tree_lines {
            out.push_str("…\n");
        }

        out.push_str("\nContent preview:\n");
        let preview: String = snapshot.content.chars().take(content_chars).collect();
        out.push_str(&preview);
        if snapshot.content.chars().count() > content_chars {
            out.push('…');
        }
        Some(out)
    }
}
