//! Response-type classification.
//!
//! Each rule is an independent predicate; the winner is the first match in
//! one explicit priority list, so classification stays deterministic when
//! several cues co-occur (an error trace quoting a diff is an error, a diff
//! inside a fence is a diff, and so on). Ambiguous input falls through to
//! plain text rather than failing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Closed set of primary response types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Text,
    Code,
    Diff,
    Error,
    ShellOutput,
    FileList,
    InteractivePrompt,
    RepoMap,
}

/// Priority order: error > diff > shell_output > file_list > repo_map >
/// code > interactive_prompt > text (the fallback).
static RULES: &[(ResponseType, fn(&str) -> bool)] = &[
    (ResponseType::Error, looks_like_error),
    (ResponseType::Diff, looks_like_diff),
    (ResponseType::ShellOutput, looks_like_shell_output),
    (ResponseType::FileList, looks_like_file_list),
    (ResponseType::RepoMap, looks_like_repo_map),
    (ResponseType::Code, looks_like_code),
    (ResponseType::InteractivePrompt, looks_like_interactive_prompt),
];

pub fn classify(text: &str) -> ResponseType {
    RULES
        .iter()
        .find(|(_, rule)| rule(text))
        .map(|(response_type, _)| *response_type)
        .unwrap_or(ResponseType::Text)
}

static ERROR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)(?:^\s*(?:error(?:\[\w+\])?:|fatal:|traceback \(most recent call last\)|\w*(?:Error|Exception):)|panicked at )",
    )
    .unwrap()
});

pub fn looks_like_error(text: &str) -> bool {
    ERROR_REGEX.is_match(text)
}

static HUNK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^@@ -\d+(?:,\d+)? \+\d+(?:,\d+)? @@").unwrap());

pub fn looks_like_diff(text: &str) -> bool {
    if HUNK_REGEX.is_match(text) {
        return true;
    }
    let has_old = text.lines().any(|l| l.starts_with("--- "));
    let has_new = text.lines().any(|l| l.starts_with("+++ "));
    has_old && has_new
}

pub fn looks_like_shell_output(text: &str) -> bool {
    text.lines().any(|l| l.trim_start().starts_with("$ "))
}

/// Several lines, most of which are bare path-like tokens.
pub fn looks_like_file_list(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 3 {
        return false;
    }
    let pathish = lines
        .iter()
        .filter(|l| {
            let token = l.trim().trim_start_matches("- ");
            !token.contains(' ') && (token.contains('/') || token.contains('.'))
        })
        .count();
    pathish * 10 >= lines.len() * 8
}

pub fn looks_like_repo_map(text: &str) -> bool {
    let drawn = text
        .lines()
        .filter(|l| l.contains("├──") || l.contains("└──") || l.contains("│"))
        .count();
    drawn >= 2 || text.lines().next().map(|l| l.trim() == ".").unwrap_or(false) && drawn >= 1
}

pub fn looks_like_code(text: &str) -> bool {
    text.contains("```")
}

static INTERACTIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:would you like|do you want|should i|shall i|which (?:file|option))\b")
        .unwrap()
});

pub fn looks_like_interactive_prompt(text: &str) -> bool {
    INTERACTIVE_REGEX.is_match(text)
}
