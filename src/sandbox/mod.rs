//! The execution sandbox: a shell-free adapter around the assistant engine.
//!
//! `SandboxAdapter` gives the engine just enough filesystem illusion to
//! reason about code — context files materialized into an instance-owned
//! scratch directory — while making shell execution and real disk mutation
//! structurally impossible: every capability the engine can invoke routes
//! through the audit-only sinks in [`sinks`], and no other implementation is
//! ever wired in. The block is one-way for the instance's lifetime.
//!
//! The adapter is also the error boundary. Nothing below it (store, engine)
//! crashes the caller; everything above it receives an `AdapterResponse`
//! with a plain-language explanation when something went wrong.

pub mod context;
pub mod engine;
pub mod prompt;
pub mod scratch;
pub mod sinks;

use std::sync::Arc;
use uuid::Uuid;

use crate::config::DrydockConfig;
use crate::errors::AdapterError;
use crate::repo::VirtualRepo;
use crate::repo::path::normalize_path;

pub use context::{ContextFile, ContextSet};
pub use engine::{Engine, EngineHooks, EngineReply, EngineRequest, ModelAlias, ReplayEngine};
pub use scratch::ScratchDir;
pub use sinks::{
    CommandClass, CommandOutcome, CommandSink, ConfirmSink, DeclineConfirmSink, FileSink,
    InterceptedCommand, ProposedWrite, RecordingCommandSink, RecordingFileSink,
};

/// Lifecycle of one adapter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Initialized,
    Processing,
    Disposed,
}

/// The caller-facing result of one `process_message` call. Never an error:
/// engine failures are folded into `content` and `error`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AdapterResponse {
    pub content: String,
    pub context_files_used: Vec<String>,
    /// Human-readable notes about what the adapter did to the prompt
    /// (auto-added files, truncations, fallbacks).
    pub conversion_notes: Vec<String>,
    /// Always empty. No code path writes to it: shell commands are
    /// intercepted and discarded, never converted.
    pub shell_commands_converted: Vec<String>,
    pub model_used: String,
    pub error: Option<String>,
}

/// One adapter instance serves one logical conversation. Calls take
/// `&mut self`, so per-session serialization is enforced by ownership
/// rather than documentation.
pub struct SandboxAdapter {
    session_id: Uuid,
    repo: Arc<VirtualRepo>,
    engine: Arc<dyn Engine>,
    config: DrydockConfig,
    model: ModelAlias,
    context: ContextSet,
    commands: RecordingCommandSink,
    files: RecordingFileSink,
    confirm: DeclineConfirmSink,
    scratch: Option<ScratchDir>,
    state: AdapterState,
}

impl SandboxAdapter {
    pub fn new(
        repo: Arc<VirtualRepo>,
        engine: Arc<dyn Engine>,
        config: DrydockConfig,
    ) -> Result<Self, AdapterError> {
        let model = config
            .model
            .default
            .parse::<ModelAlias>()
            .unwrap_or_default();
        Ok(Self {
            session_id: Uuid::new_v4(),
            repo,
            engine,
            config,
            model,
            context: ContextSet::new(),
            commands: RecordingCommandSink::new(),
            files: RecordingFileSink::new(),
            confirm: DeclineConfirmSink,
            scratch: Some(ScratchDir::new()?),
            state: AdapterState::Initialized,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn model(&self) -> ModelAlias {
        self.model
    }

    pub fn context_files(&self) -> Vec<ContextFile> {
        self.context.iter().cloned().collect()
    }

    /// Add a repository file to the conversation context. The path must
    /// resolve through the virtual store; stale paths fail rather than being
    /// silently accepted.
    pub async fn add_file(&mut self, path: &str) -> Result<(), AdapterError> {
        self.require_live()?;
        let path = normalize_path(path);
        let meta = self
            .repo
            .get_file_metadata(&path)
            .await
            .ok_or(AdapterError::FileNotInRepo { path: path.clone() })?;
        self.context.insert(ContextFile::from_metadata(&meta));
        tracing::debug!(session = %self.session_id, path, "Added context file");
        Ok(())
    }

    pub fn remove_file(&mut self, path: &str) -> Result<(), AdapterError> {
        self.require_live()?;
        let path = normalize_path(path);
        if self.context.remove(&path) {
            tracing::debug!(session = %self.session_id, path, "Removed context file");
            Ok(())
        } else {
            Err(AdapterError::FileNotInContext { path })
        }
    }

    /// Switch models. Validated against the fixed alias table before any
    /// engine call; switching rebuilds the stored handle.
    pub fn set_model(&mut self, alias: &str) -> Result<(), AdapterError> {
        self.require_live()?;
        self.model = alias.parse::<ModelAlias>()?;
        tracing::info!(session = %self.session_id, model = %self.model, "Model switched");
        Ok(())
    }

    /// Run one conversation turn: auto-grounding, prompt assembly, scratch
    /// rewrite, engine call. Engine failures come back inside the response,
    /// never as an `Err`.
    pub async fn process_message(
        &mut self,
        message: &str,
        extra_context: Option<&str>,
    ) -> AdapterResponse {
        if self.state == AdapterState::Disposed {
            return self.failed_response("This session has been closed. Start a new session to continue.");
        }
        self.state = AdapterState::Processing;
        let mut notes = Vec::new();

        // Analysis questions with an empty context get auto-grounding
        if self.context.is_empty() && prompt::is_repo_analysis_question(message) {
            let candidates = self.repo.list_files(None).await;
            let picks = prompt::select_important_files(
                &candidates,
                message,
                self.config.prompt.max_auto_context_files,
            );
            for path in &picks {
                if self.add_file(path).await.is_ok() {
                    notes.push(format!("Auto-added {} to context", path));
                }
            }
        }

        // Resolve context contents; files that vanished from the snapshot
        // are dropped with a note instead of poisoning the prompt
        let mut resolved: Vec<(ContextFile, String)> = Vec::new();
        for file in self.context.iter() {
            match self.repo.get_file_content(&file.path).await {
                Some(content) => resolved.push((file.clone(), content)),
                None => notes.push(format!("Skipped {}: no longer in snapshot", file.path)),
            }
        }

        // Full rewrite of the scratch directory before every call, so a
        // cancelled previous call can never leak stale state forward
        if let Some(scratch) = &self.scratch {
            let files: Vec<(String, String)> = resolved
                .iter()
                .map(|(f, c)| (f.path.clone(), c.clone()))
                .collect();
            if let Err(err) = scratch.materialize(&files) {
                tracing::warn!(session = %self.session_id, error = %err, "Scratch rewrite failed");
                self.state = AdapterState::Initialized;
                return self.failed_response(
                    "The working directory for this session could not be prepared. Please retry.",
                );
            }
        }

        let overview = if resolved.is_empty() {
            self.repo
                .overview(
                    self.config.prompt.tree_preview_lines,
                    self.config.prompt.content_preview_chars,
                )
                .await
        } else {
            None
        };
        let prompt = prompt::build_prompt(
            message,
            &resolved,
            overview.as_deref(),
            extra_context,
            &self.config.prompt,
        );

        let request = EngineRequest {
            prompt,
            model: self.model.model_id().to_string(),
        };
        let hooks = EngineHooks {
            commands: &self.commands,
            files: &self.files,
            confirm: &self.confirm,
            scratch: self
                .scratch
                .as_ref()
                .map(|s| s.path())
                .unwrap_or_else(|| std::path::Path::new("")),
        };

        let result = self.engine.run(&request, hooks).await;
        self.state = AdapterState::Initialized;

        match result {
            Ok(reply) => {
                for write in self.files.writes() {
                    self.context.mark_modified(&normalize_path(&write.path));
                }
                AdapterResponse {
                    content: reply.content,
                    context_files_used: self.context.paths(),
                    conversion_notes: notes,
                    shell_commands_converted: Vec::new(),
                    model_used: self.model.as_str().to_string(),
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(session = %self.session_id, error = %err, "Engine call failed");
                AdapterResponse {
                    content: "The assistant could not process this message. Please try again."
                        .to_string(),
                    context_files_used: self.context.paths(),
                    conversion_notes: notes,
                    shell_commands_converted: Vec::new(),
                    model_used: self.model.as_str().to_string(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Audit trail of every shell command the engine attempted.
    pub fn intercepted_commands(&self) -> Vec<InterceptedCommand> {
        self.commands.records()
    }

    /// File modifications the engine proposed. Never auto-applied.
    pub fn proposed_writes(&self) -> Vec<ProposedWrite> {
        self.files.writes()
    }

    /// Dispose the adapter: delete the scratch directory and refuse further
    /// work. Shell execution stays blocked; there is nothing to restore.
    pub fn cleanup(&mut self) {
        self.scratch = None;
        self.context.clear();
        self.state = AdapterState::Disposed;
        tracing::debug!(session = %self.session_id, "Adapter disposed");
    }

    fn require_live(&self) -> Result<(), AdapterError> {
        if self.state == AdapterState::Disposed {
            return Err(AdapterError::Other(anyhow::anyhow!(
                "adapter has been disposed"
            )));
        }
        Ok(())
    }

    fn failed_response(&self, message: &str) -> AdapterResponse {
        AdapterResponse {
            content: message.to_string(),
            context_files_used: self.context.paths(),
            conversion_notes: Vec::new(),
            shell_commands_converted: Vec::new(),
            model_used: self.model.as_str().to_string(),
            error: Some(message.to_string()),
        }
    }
}
