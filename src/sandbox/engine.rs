//! The assistant engine seam.
//!
//! The production LLM engine is an external collaborator; the sandbox only
//! depends on the `Engine` trait. Engines are constructed to call through
//! the capability sinks in `EngineHooks` for every command, write, or
//! confirmation attempt — they have no other route to the outside world.
//!
//! Real implementation: out of crate. Test/demo double: `ReplayEngine`.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use super::sinks::{CommandSink, ConfirmSink, FileSink};
use crate::errors::AdapterError;

/// Fixed table of user-facing model aliases and their pinned model ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelAlias {
    Haiku,
    #[default]
    Sonnet,
    Opus,
    Gpt4o,
    Gpt4oMini,
}

impl ModelAlias {
    pub fn all() -> &'static [ModelAlias] {
        &[
            ModelAlias::Haiku,
            ModelAlias::Sonnet,
            ModelAlias::Opus,
            ModelAlias::Gpt4o,
            ModelAlias::Gpt4oMini,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelAlias::Haiku => "haiku",
            ModelAlias::Sonnet => "sonnet",
            ModelAlias::Opus => "opus",
            ModelAlias::Gpt4o => "gpt-4o",
            ModelAlias::Gpt4oMini => "gpt-4o-mini",
        }
    }

    /// The concrete model id handed to the engine.
    pub fn model_id(&self) -> &'static str {
        match self {
            ModelAlias::Haiku => "claude-3-5-haiku-latest",
            ModelAlias::Sonnet => "claude-sonnet-4-0",
            ModelAlias::Opus => "claude-opus-4-1",
            ModelAlias::Gpt4o => "gpt-4o",
            ModelAlias::Gpt4oMini => "gpt-4o-mini",
        }
    }
}

impl std::fmt::Display for ModelAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelAlias {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "haiku" => Ok(ModelAlias::Haiku),
            "sonnet" => Ok(ModelAlias::Sonnet),
            "opus" => Ok(ModelAlias::Opus),
            "gpt-4o" | "gpt4o" => Ok(ModelAlias::Gpt4o),
            "gpt-4o-mini" | "gpt4o-mini" => Ok(ModelAlias::Gpt4oMini),
            _ => Err(AdapterError::InvalidModel {
                alias: s.to_string(),
            }),
        }
    }
}

/// Everything an engine call may touch: the three capability sinks and the
/// scratch directory holding the materialized context files.
pub struct EngineHooks<'a> {
    pub commands: &'a dyn CommandSink,
    pub files: &'a dyn FileSink,
    pub confirm: &'a dyn ConfirmSink,
    pub scratch: &'a Path,
}

#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub prompt: String,
    /// Pinned model id from `ModelAlias::model_id`.
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct EngineReply {
    pub content: String,
}

/// Abstraction over the assistant engine call for testability.
/// Real implementation: external LLM client. Test double: `ReplayEngine`.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn run(
        &self,
        request: &EngineRequest,
        hooks: EngineHooks<'_>,
    ) -> anyhow::Result<EngineReply>;
}

/// Scripted engine: replays canned replies in order. Used by tests and the
/// CLI demo; once the script runs out it echoes a fixed acknowledgement.
#[derive(Debug, Default)]
pub struct ReplayEngine {
    replies: Mutex<VecDeque<String>>,
}

impl ReplayEngine {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }

    pub fn scripted(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| r.to_string()).collect())
    }
}

#[async_trait]
impl Engine for ReplayEngine {
    async fn run(
        &self,
        request: &EngineRequest,
        _hooks: EngineHooks<'_>,
    ) -> anyhow::Result<EngineReply> {
        let next = self.replies.lock().expect("replay lock").pop_front();
        let content = next.unwrap_or_else(|| {
            format!(
                "Acknowledged ({} chars of prompt, model {}).",
                request.prompt.chars().count(),
                request.model
            )
        });
        Ok(EngineReply { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::sinks::{DeclineConfirmSink, RecordingCommandSink, RecordingFileSink};

    #[test]
    fn test_model_alias_round_trip() {
        for alias in ModelAlias::all() {
            let parsed: ModelAlias = alias.as_str().parse().unwrap();
            assert_eq!(parsed, *alias);
        }
    }

    #[test]
    fn test_model_alias_rejects_unknown() {
        let err = "gpt-9".parse::<ModelAlias>().unwrap_err();
        assert!(matches!(err, AdapterError::InvalidModel { .. }));
        assert!("".parse::<ModelAlias>().is_err());
    }

    #[test]
    fn test_model_alias_is_case_insensitive() {
        assert_eq!("Sonnet".parse::<ModelAlias>().unwrap(), ModelAlias::Sonnet);
        assert_eq!(" OPUS ".parse::<ModelAlias>().unwrap(), ModelAlias::Opus);
    }

    #[test]
    fn test_default_alias_is_sonnet() {
        assert_eq!(ModelAlias::default(), ModelAlias::Sonnet);
    }

    #[tokio::test]
    async fn test_replay_engine_plays_script_in_order() {
        let engine = ReplayEngine::scripted(&["first", "second"]);
        let commands = RecordingCommandSink::new();
        let files = RecordingFileSink::new();
        let confirm = DeclineConfirmSink;
        let scratch = std::env::temp_dir();
        let request = EngineRequest {
            prompt: "hello".into(),
            model: ModelAlias::Sonnet.model_id().into(),
        };

        for expected in ["first", "second"] {
            let reply = engine
                .run(
                    &request,
                    EngineHooks {
                        commands: &commands,
                        files: &files,
                        confirm: &confirm,
                        scratch: &scratch,
                    },
                )
                .await
                .unwrap();
            assert_eq!(reply.content, expected);
        }

        // Script exhausted: falls back to the acknowledgement line
        let reply = engine
            .run(
                &request,
                EngineHooks {
                    commands: &commands,
                    files: &files,
                    confirm: &confirm,
                    scratch: &scratch,
                },
            )
            .await
            .unwrap();
        assert!(reply.content.starts_with("Acknowledged"));
    }
}
