//! Conversation-scoped context files.
//!
//! A `ContextFile` records that the assistant currently "sees" one
//! repository file in this conversation. It is distinct from
//! `repo::FileMetadata`: metadata describes existence in the repository,
//! a context file describes inclusion in the conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repo::FileMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextFile {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub language: Option<String>,
    pub added_at: DateTime<Utc>,
    /// Set when the engine has proposed a modification to this file.
    pub is_modified: bool,
}

impl ContextFile {
    pub fn from_metadata(meta: &FileMetadata) -> Self {
        Self {
            path: meta.path.clone(),
            name: meta.name.clone(),
            size: meta.size,
            language: meta.language.clone(),
            added_at: Utc::now(),
            is_modified: false,
        }
    }
}

/// Ordered set of context files, keyed by normalized path. Insertion order
/// is preserved so prompt assembly is deterministic.
#[derive(Debug, Default)]
pub struct ContextSet {
    files: Vec<ContextFile>,
}

impl ContextSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a context file. Re-adding an existing path refreshes its entry
    /// in place and reports false.
    pub fn insert(&mut self, file: ContextFile) -> bool {
        if let Some(existing) = self.files.iter_mut().find(|f| f.path == file.path) {
            *existing = file;
            false
        } else {
            self.files.push(file);
            true
        }
    }

    /// Remove by path; true when something was removed.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.path != path);
        self.files.len() != before
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn mark_modified(&mut self, path: &str) {
        if let Some(file) = self.files.iter_mut().find(|f| f.path == path) {
            file.is_modified = true;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextFile> {
        self.files.iter()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}
