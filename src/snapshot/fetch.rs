//! The snapshot fetch job: pull a repository branch from the GitHub REST API
//! and fold it into a `RepositorySnapshot`.
//!
//! This is the only networked code in the crate. Everything downstream of it
//! (the virtual store, the sandbox) works purely against cached snapshots.
//! The whole fetch is bounded by one overall timeout; on expiry the caller
//! sees `SnapshotError::FetchTimeout`, never a hang.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{RepoKey, RepositorySnapshot, SnapshotBuilder};
use crate::config::FetchConfig;
use crate::errors::SnapshotError;

/// Extensions skipped when building the content blob: binary payloads that
/// would corrupt a text snapshot.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "bmp", "webp", "svgz", "pdf", "zip", "tar", "gz", "bz2",
    "xz", "7z", "woff", "woff2", "ttf", "otf", "eot", "exe", "dll", "so", "dylib", "a", "o",
    "class", "jar", "war", "pyc", "wasm", "bin", "dat", "db", "sqlite", "mp3", "mp4", "mov",
    "avi", "webm",
];

/// Source of repository-host credentials for the fetch job.
///
/// Absence of a token is not an error: public repositories fetch fine
/// unauthenticated, just at a lower rate limit.
pub trait TokenProvider: Send + Sync {
    fn token(&self, owner: &str) -> Option<String>;
}

/// Token provider backed by the `GITHUB_TOKEN` environment variable.
pub struct EnvTokenProvider;

impl TokenProvider for EnvTokenProvider {
    fn token(&self, _owner: &str) -> Option<String> {
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Token provider that never has a token. Used in tests and wherever the
/// fetch path must stay unauthenticated.
pub struct NoTokenProvider;

impl TokenProvider for NoTokenProvider {
    fn token(&self, _owner: &str) -> Option<String> {
        None
    }
}

/// Abstraction over snapshot production for testability.
/// Real implementation: `GithubFetcher`. Test doubles live beside the tests
/// that need them; `DisabledFetcher` covers the offline CLI paths.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch(&self, key: &RepoKey, branch: &str)
    -> Result<RepositorySnapshot, SnapshotError>;
}

/// Fetcher that always reports failure. Wired into the virtual store when
/// only pre-built snapshots should ever be served.
pub struct DisabledFetcher;

#[async_trait]
impl SnapshotFetcher for DisabledFetcher {
    async fn fetch(
        &self,
        key: &RepoKey,
        _branch: &str,
    ) -> Result<RepositorySnapshot, SnapshotError> {
        Err(SnapshotError::FetchFailed {
            repo: key.slug(),
            source: anyhow::anyhow!("snapshot fetching is disabled"),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    size: Option<u64>,
}

/// Fetches one branch through the GitHub REST API:
/// recursive git tree listing first, then raw contents per file.
pub struct GithubFetcher {
    client: reqwest::Client,
    config: FetchConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl GithubFetcher {
    pub fn new(config: FetchConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            tokens,
        }
    }

    /// Send one API GET. A 401 with a token present retries unauthenticated
    /// so a stale credential cannot block public-repo fetches.
    async fn api_get(
        &self,
        url: &str,
        accept: &str,
        token: Option<&str>,
    ) -> anyhow::Result<reqwest::Response> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", accept)
            .header("User-Agent", self.config.user_agent.clone());
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED && token.is_some() {
            tracing::warn!(url, "Token rejected; retrying unauthenticated");
            return Box::pin(self.api_get(url, accept, None)).await;
        }
        Ok(response)
    }

    async fn fetch_inner(
        &self,
        key: &RepoKey,
        branch: &str,
    ) -> Result<RepositorySnapshot, SnapshotError> {
        let token = self.tokens.token(&key.owner);
        let tree_url = format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.config.api_base,
            key.slug(),
            branch
        );

        let response = self
            .api_get(&tree_url, "application/vnd.github+json", token.as_deref())
            .await
            .map_err(|source| SnapshotError::FetchFailed {
                repo: key.slug(),
                source,
            })?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => {
                return Err(SnapshotError::BranchNotFound {
                    repo: key.slug(),
                    branch: branch.to_string(),
                });
            }
            reqwest::StatusCode::FORBIDDEN | reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(SnapshotError::RateLimited { repo: key.slug() });
            }
            _ => {}
        }

        let response = response
            .error_for_status()
            .map_err(|source| SnapshotError::FetchFailed {
                repo: key.slug(),
                source: source.into(),
            })?;
        let tree: TreeResponse = response
            .json()
            .await
            .map_err(|source| SnapshotError::FetchFailed {
                repo: key.slug(),
                source: anyhow::Error::from(source).context("Failed to parse git tree response"),
            })?;

        if tree.truncated {
            tracing::warn!(repo = %key.slug(), "Git tree listing was truncated by the API");
        }

        let mut builder = SnapshotBuilder::new(&key.slug(), branch);
        let mut fetched = 0usize;
        for entry in &tree.tree {
            if entry.entry_type != "blob" || !self.wants_file(entry) {
                continue;
            }
            if fetched >= self.config.max_files {
                tracing::warn!(
                    repo = %key.slug(),
                    limit = self.config.max_files,
                    "File limit reached; snapshot is partial"
                );
                break;
            }
            match self.fetch_file(key, branch, &entry.path, token.as_deref()).await {
                Ok(content) => {
                    builder = builder.add_file(&entry.path, &content);
                    fetched += 1;
                }
                Err(err) => {
                    // One unreadable file does not sink the snapshot
                    tracing::warn!(repo = %key.slug(), path = %entry.path, error = %err, "Skipping file");
                }
            }
        }

        let snapshot = builder.build();
        tracing::info!(
            repo = %key.slug(),
            branch,
            files = fetched,
            tokens = snapshot.metadata.estimated_tokens,
            "Snapshot fetched"
        );
        Ok(snapshot)
    }

    fn wants_file(&self, entry: &TreeEntry) -> bool {
        if entry.size.unwrap_or(0) > self.config.max_file_bytes {
            return false;
        }
        let ext = entry
            .path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext {
            Some(ext) => !BINARY_EXTENSIONS.contains(&ext.as_str()),
            None => true,
        }
    }

    async fn fetch_file(
        &self,
        key: &RepoKey,
        branch: &str,
        path: &str,
        token: Option<&str>,
    ) -> anyhow::Result<String> {
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.config.api_base,
            key.slug(),
            path,
            branch
        );
        // The raw media type returns file bytes directly, skipping the
        // base64 JSON envelope.
        let response = self
            .api_get(&url, "application/vnd.github.raw", token)
            .await?
            .error_for_status()
            .with_context(|| format!("Contents API returned error status for {}", path))?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read contents of {}", path))
    }
}

#[async_trait]
impl SnapshotFetcher for GithubFetcher {
    async fn fetch(
        &self,
        key: &RepoKey,
        branch: &str,
    ) -> Result<RepositorySnapshot, SnapshotError> {
        let deadline = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(deadline, self.fetch_inner(key, branch)).await {
            Ok(result) => result,
            Err(_) => Err(SnapshotError::FetchTimeout {
                repo: key.slug(),
                secs: self.config.timeout_secs,
            }),
        }
    }
}
