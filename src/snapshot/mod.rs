//! Snapshot types and the backing store interface.
//!
//! A snapshot is a cached, point-in-time textual representation of one
//! repository branch: a concatenated content blob (per-file text under
//! header markers), a tree listing, and metadata. Snapshots are immutable
//! once stored and replaced wholesale by the fetch job; nothing in this
//! subsystem ever mutates one in place.

pub mod builder;
pub mod fetch;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use builder::SnapshotBuilder;
pub use fetch::{
    DisabledFetcher, EnvTokenProvider, GithubFetcher, NoTokenProvider, SnapshotFetcher,
    TokenProvider,
};

/// Canonical `owner/name` identifier for one repository.
///
/// The branch is deliberately not part of the key; it travels as a separate
/// parameter everywhere, matching the snapshot store's key format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoKey {
    pub owner: String,
    pub name: String,
}

impl RepoKey {
    /// Parse an `owner/name` slug. Exactly two non-empty segments.
    pub fn parse(slug: &str) -> Result<Self> {
        let parts: Vec<&str> = slug.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            bail!("Invalid repository slug '{}': expected owner/name", slug);
        }
        Ok(Self {
            owner: parts[0].to_string(),
            name: parts[1].to_string(),
        })
    }

    /// The `owner/name` slug form.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepoKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Metadata recorded alongside each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// When the fetch job produced this snapshot.
    pub fetched_at: DateTime<Utc>,
    /// Rough token estimate for the content blob (¼ char heuristic).
    pub estimated_tokens: u64,
}

/// One cached repository snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    /// `owner/name` slug of the repository.
    pub repo: String,
    /// Branch this snapshot was taken from.
    pub branch: String,
    /// Concatenated per-file text under `FILE:` header markers.
    pub content: String,
    /// Indented tree listing of the repository structure.
    pub tree: String,
    pub metadata: SnapshotMetadata,
}

impl RepositorySnapshot {
    /// Cache key for this snapshot's repo+branch pair.
    pub fn cache_key(&self) -> String {
        store_key(&self.repo, &self.branch)
    }
}

/// Store key format: `owner/name@branch`.
fn store_key(repo: &str, branch: &str) -> String {
    format!("{repo}@{branch}")
}

/// Key-value cache of snapshots, shared read-only across all virtual
/// repository instances for the same key. Only the fetch job writes.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Look up the snapshot for a repo+branch, if cached.
    async fn get(&self, key: &RepoKey, branch: &str) -> Option<Arc<RepositorySnapshot>>;

    /// Store (or wholesale replace) a snapshot.
    async fn put(&self, snapshot: RepositorySnapshot);
}

/// In-process snapshot store backed by a `HashMap`.
///
/// This is the production store for a single-process deployment and the
/// fixture store for tests. Values are `Arc`-shared so readers never copy
/// blob text.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: RwLock<HashMap<String, Arc<RepositorySnapshot>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached snapshots.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, key: &RepoKey, branch: &str) -> Option<Arc<RepositorySnapshot>> {
        self.entries
            .read()
            .await
            .get(&store_key(&key.slug(), branch))
            .cloned()
    }

    async fn put(&self, snapshot: RepositorySnapshot) {
        let key = snapshot.cache_key();
        self.entries.write().await.insert(key, Arc::new(snapshot));
    }
}
