//! Snapshot construction from a set of in-memory files.
//!
//! The fetch job collects per-file text and hands it here; `SnapshotBuilder`
//! renders the two blobs a snapshot carries:
//! - the content blob: each file's text under a `FILE: <path>` header line
//! - the tree blob: an indented listing with a `.` root line, four columns
//!   per depth level, and a trailing `/` on directory entries
//!
//! The builder is also the canonical fixture generator: tests and the CLI
//! build snapshots through it so the parsing side is always exercised
//! against the format the fetch job actually produces.

use chrono::Utc;
use std::collections::BTreeMap;

use super::{RepositorySnapshot, SnapshotMetadata};
use crate::repo::path::normalize_path;

/// Rough chars-per-token ratio used for the size estimate.
const CHARS_PER_TOKEN: u64 = 4;

/// Accumulates files and renders them into one `RepositorySnapshot`.
pub struct SnapshotBuilder {
    repo: String,
    branch: String,
    files: Vec<(String, String)>,
}

impl SnapshotBuilder {
    pub fn new(repo: &str, branch: &str) -> Self {
        Self {
            repo: repo.to_string(),
            branch: branch.to_string(),
            files: Vec::new(),
        }
    }

    /// Add one file. The path is normalized; a later add with the same
    /// normalized path replaces the earlier content.
    pub fn add_file(mut self, path: &str, content: &str) -> Self {
        let path = normalize_path(path);
        if let Some(existing) = self.files.iter_mut().find(|(p, _)| *p == path) {
            existing.1 = content.to_string();
        } else {
            self.files.push((path, content.to_string()));
        }
        self
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Render the accumulated files into an immutable snapshot.
    pub fn build(mut self) -> RepositorySnapshot {
        self.files.sort_by(|a, b| a.0.cmp(&b.0));
        let content = render_content(&self.files);
        let tree = render_tree(&self.files);
        let estimated_tokens = (content.chars().count() as u64) / CHARS_PER_TOKEN;
        RepositorySnapshot {
            repo: self.repo,
            branch: self.branch,
            content,
            tree,
            metadata: SnapshotMetadata {
                fetched_at: Utc::now(),
                estimated_tokens,
            },
        }
    }
}

fn render_content(files: &[(String, String)]) -> String {
    let mut blob = String::new();
    for (path, content) in files {
        blob.push_str("FILE: ");
        blob.push_str(path);
        blob.push('\n');
        blob.push_str(content);
        if !content.ends_with('\n') {
            blob.push('\n');
        }
        blob.push('\n');
    }
    blob
}

/// Directory tree assembled from slash-separated paths.
#[derive(Default)]
struct TreeNode {
    dirs: BTreeMap<String, TreeNode>,
    files: Vec<String>,
}

fn render_tree(files: &[(String, String)]) -> String {
    let mut root = TreeNode::default();
    for (path, _) in files {
        let mut node = &mut root;
        let segments: Vec<&str> = path.split('/').collect();
        for dir in &segments[..segments.len() - 1] {
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        node.files.push(segments[segments.len() - 1].to_string());
    }

    let mut out = String::from(".\n");
    render_node(&root, 1, &mut out);
    out
}

fn render_node(node: &TreeNode, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    for (name, child) in &node.dirs {
        out.push_str(&indent);
        out.push_str(name);
        out.push_str("/\n");
        render_node(child, depth + 1, out);
    }
    let mut files = node.files.clone();
    files.sort();
    for name in files {
        out.push_str(&indent);
        out.push_str(&name);
        out.push('\n');
    }
}
