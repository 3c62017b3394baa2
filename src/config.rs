//! Layered configuration for the drydock subsystem.
//!
//! Settings come from three layers, later layers winning:
//! 1. Built-in defaults (every field has one; a missing file is fine)
//! 2. An optional `drydock.toml` in the working directory
//! 3. Environment variables (`DRYDOCK_FETCH_TIMEOUT_SECS`, `DRYDOCK_API_BASE`)
//!
//! # Configuration File Format
//!
//! ```toml
//! [fetch]
//! timeout_secs = 30
//! api_base = "https://api.github.com"
//! user_agent = "drydock"
//! max_file_bytes = 262144
//! max_files = 500
//!
//! [prompt]
//! max_context_file_chars = 12000
//! tree_preview_lines = 50
//! content_preview_chars = 2000
//! max_auto_context_files = 5
//!
//! [model]
//! default = "sonnet"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for the snapshot fetch job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Overall deadline for one fetch-and-store pass. On expiry the store
    /// reports "unavailable" instead of hanging the caller.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base URL of the repository host API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// User-Agent header sent with every API request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Files larger than this are skipped when building the content blob.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Upper bound on the number of files folded into one snapshot.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    "drydock".to_string()
}

fn default_max_file_bytes() -> u64 {
    256 * 1024
}

fn default_max_files() -> usize {
    500
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            max_file_bytes: default_max_file_bytes(),
            max_files: default_max_files(),
        }
    }
}

/// Limits applied while assembling the enhanced prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Per-file ceiling; context files longer than this are truncated with a
    /// marker so one large file cannot blow up the prompt.
    #[serde(default = "default_max_context_file_chars")]
    pub max_context_file_chars: usize,
    /// Lines of the tree listing included in the repository overview.
    #[serde(default = "default_tree_preview_lines")]
    pub tree_preview_lines: usize,
    /// Characters of the content blob included in the repository overview.
    #[serde(default = "default_content_preview_chars")]
    pub content_preview_chars: usize,
    /// Maximum files the adapter auto-selects for an analysis question
    /// asked with an empty context set.
    #[serde(default = "default_max_auto_context_files")]
    pub max_auto_context_files: usize,
}

fn default_max_context_file_chars() -> usize {
    12_000
}

fn default_tree_preview_lines() -> usize {
    50
}

fn default_content_preview_chars() -> usize {
    2_000
}

fn default_max_auto_context_files() -> usize {
    5
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_context_file_chars: default_max_context_file_chars(),
            tree_preview_lines: default_tree_preview_lines(),
            content_preview_chars: default_content_preview_chars(),
            max_auto_context_files: default_max_auto_context_files(),
        }
    }
}

/// Model selection defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Alias used when a session never calls `set_model`.
    #[serde(default = "default_model")]
    pub default: String,
}

fn default_model() -> String {
    "sonnet".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default: default_model(),
        }
    }
}

/// Top-level drydock configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrydockConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl DrydockConfig {
    /// Load configuration from `drydock.toml` under `dir`, falling back to
    /// defaults when the file does not exist. Environment overrides are
    /// applied on top.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join("drydock.toml");
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment-variable overrides.
    fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var("DRYDOCK_FETCH_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => self.fetch.timeout_secs = secs,
                Err(_) => tracing::warn!(
                    value = %raw,
                    "Ignoring non-numeric DRYDOCK_FETCH_TIMEOUT_SECS"
                ),
            }
        }
        if let Ok(base) = std::env::var("DRYDOCK_API_BASE") {
            self.fetch.api_base = base;
        }
    }

    /// Sanity-check the loaded values, returning human-readable warnings.
    /// Zero-valued limits are allowed (tests use them) but worth flagging.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.fetch.timeout_secs == 0 {
            warnings.push("fetch.timeout_secs is 0; every cold fetch will fail".to_string());
        }
        if self.prompt.max_context_file_chars == 0 {
            warnings.push(
                "prompt.max_context_file_chars is 0; context files will be empty".to_string(),
            );
        }
        if self.prompt.max_auto_context_files == 0 {
            warnings
                .push("prompt.max_auto_context_files is 0; auto-selection is disabled".to_string());
        }
        warnings
    }
}
