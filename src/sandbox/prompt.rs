//! Enhanced-prompt assembly.
//!
//! The engine never sees the bare user message. It sees the message plus
//! either the content of every context file (truncated per-file to bound
//! prompt size) or, when the context set is empty, a repository overview so
//! the assistant is never left with zero grounding. Repository-analysis
//! questions asked with an empty context additionally trigger auto-selection
//! of a few important files — an ungrounded assistant reliably hallucinates
//! structure otherwise.

use crate::config::PromptConfig;
use crate::repo::path::file_name;
use crate::sandbox::context::ContextFile;

/// Phrases that mark a message as asking about the repository as a whole.
const ANALYSIS_KEYWORDS: &[&str] = &[
    "structure",
    "architecture",
    "overview",
    "organized",
    "organised",
    "codebase",
    "analyze this repo",
    "analyse this repo",
    "what does this repo",
    "what does this project",
    "how does this project",
    "explain the repo",
    "explain this repository",
    "tell me about this repo",
];

/// Filename keywords that suggest domain relevance (tier 5 of the
/// importance ranking).
const DOMAIN_KEYWORDS: &[&str] = &[
    "api", "auth", "model", "schema", "config", "route", "handler", "service", "server", "client",
    "core", "db", "database",
];

const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "rs", "js", "ts", "tsx", "jsx", "go", "rb", "java", "c", "cpp", "cs", "php", "swift",
    "kt",
];

pub fn is_repo_analysis_question(message: &str) -> bool {
    let lower = message.to_lowercase();
    ANALYSIS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Rank repository files by importance and return up to `limit` of them.
///
/// Priority tiers, best first:
/// 1. README files
/// 2. License files
/// 3. Build/config manifests
/// 4. Entry points (`main.*`, `index.*`, `app.*`, `lib.rs`)
/// 5. Filenames matching a domain keyword or a word from the message
/// 6. Any other source file
pub fn select_important_files(files: &[String], message: &str, limit: usize) -> Vec<String> {
    let message_words: Vec<String> = message
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(str::to_string)
        .collect();

    let mut ranked: Vec<(u8, &String)> = files
        .iter()
        .filter_map(|path| importance_tier(path, &message_words).map(|tier| (tier, path)))
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    ranked.into_iter().take(limit).map(|(_, p)| p.clone()).collect()
}

fn importance_tier(path: &str, message_words: &[String]) -> Option<u8> {
    let name = file_name(path).to_lowercase();
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(&name);

    if stem == "readme" {
        return Some(1);
    }
    if stem == "license" || stem == "licence" || stem == "copying" {
        return Some(2);
    }
    if matches!(
        name.as_str(),
        "cargo.toml"
            | "package.json"
            | "pyproject.toml"
            | "setup.py"
            | "go.mod"
            | "requirements.txt"
            | "gemfile"
            | "pom.xml"
            | "build.gradle"
            | "makefile"
            | "dockerfile"
    ) {
        return Some(3);
    }
    if matches!(stem, "main" | "index" | "app" | "__main__") || name == "lib.rs" {
        return Some(4);
    }
    let lower_path = path.to_lowercase();
    if DOMAIN_KEYWORDS.iter().any(|kw| name.contains(kw))
        || message_words.iter().any(|w| lower_path.contains(w.as_str()))
    {
        return Some(5);
    }
    let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    if SOURCE_EXTENSIONS.contains(&ext) {
        return Some(6);
    }
    None
}

/// Truncate on a char boundary, appending a marker when content was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("\n… [truncated]");
    out
}

/// Assemble the enhanced prompt.
///
/// `context` pairs each context file with its current content; `overview`
/// is the repository overview used only when `context` is empty. An empty
/// context with no overview (snapshot unavailable) produces the bare
/// message.
pub fn build_prompt(
    message: &str,
    context: &[(ContextFile, String)],
    overview: Option<&str>,
    extra_context: Option<&str>,
    config: &PromptConfig,
) -> String {
    let mut prompt = String::from(message);

    if let Some(extra) = extra_context.filter(|e| !e.trim().is_empty()) {
        prompt.push_str("\n\nAdditional context:\n");
        prompt.push_str(extra);
    }

    if context.is_empty() {
        if let Some(overview) = overview {
            prompt.push_str("\n\n");
            prompt.push_str(overview);
        }
        return prompt;
    }

    prompt.push_str("\n\nFiles currently in context:\n");
    for (file, content) in context {
        prompt.push_str("\n### ");
        prompt.push_str(&file.path);
        prompt.push('\n');
        prompt.push_str("```");
        if let Some(language) = &file.language {
            prompt.push_str(language);
        }
        prompt.push('\n');
        prompt.push_str(&truncate_chars(content, config.max_context_file_chars));
        prompt.push_str("\n```\n");
    }
    prompt
}
