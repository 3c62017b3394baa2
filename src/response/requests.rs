//! File-request extraction.
//!
//! Assistants routinely ask for more context in prose ("please add
//! `src/app.py` to the chat"). A fixed battery of patterns locates these
//! requests; each candidate must look like a repository file (recognized
//! extension, or path-like) and must clear a denylist of false positives
//! (URLs, bare domains, `example.*` placeholders). Accepted requests carry
//! `auto_add: false` — a human approves every addition; the processor never
//! adds files itself.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::repo::language::has_code_extension;

/// One requested file, pending human approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRequest {
    pub path: String,
    /// Nearby text excerpt explaining why the assistant asked.
    pub reason: String,
    /// Always false: additions require explicit approval.
    pub auto_add: bool,
}

// Each pattern captures a span that may name one file or an "X and Y"
// conjunction of several; candidates are split out of the span afterwards.
static REQUEST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)please add (.+?) to the (?:chat|context|conversation)",
        r"(?i)add (.+?) to the (?:chat|context|conversation)",
        r"(?i)i(?:'d| would)? need(?: to see)?(?: the contents of)? (.+?)(?:\.\s|\.$|$|,|;)",
        r"(?i)(?:could|can) you (?:share|show me|add) (.+?)(?:\?|\.\s|\.$|$)",
        r"(?i)show me (.+?)(?:\?|\.\s|\.$|$)",
        r"(?i)search for (.+?) and add (?:the|that|this) file",
        r"(?i)let me see (.+?)(?:\.\s|\.$|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\w-]+\.(?:com|org|net|io|dev|ai|co|edu|gov)$").unwrap()
});

/// Extract file requests from one response text, deduplicated by path in
/// order of first appearance.
pub fn extract_file_requests(text: &str) -> Vec<FileRequest> {
    let mut requests: Vec<FileRequest> = Vec::new();
    for pattern in REQUEST_PATTERNS.iter() {
        for cap in pattern.captures_iter(text) {
            let whole = cap.get(0).map(|m| m.as_str()).unwrap_or_default();
            let span = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            for candidate in candidates_from_span(span) {
                if !is_accepted_path(&candidate) {
                    continue;
                }
                if requests.iter().any(|r| r.path == candidate) {
                    continue;
                }
                requests.push(FileRequest {
                    path: candidate,
                    reason: excerpt(whole),
                    auto_add: false,
                });
            }
        }
    }
    requests
}

/// Split a captured span into individual candidates: backtick/quote-wrapped
/// tokens first, otherwise conjunction splitting on `,` / `and`.
fn candidates_from_span(span: &str) -> Vec<String> {
    let quoted: Vec<String> = span
        .split(['`', '"', '\''])
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !quoted.is_empty() {
        return quoted;
    }

    span.split(',')
        .flat_map(|part| part.split(" and "))
        .flat_map(|part| {
            // Trailing prose may ride along in the span; keep only the
            // tokens that could be paths
            part.split_whitespace()
                .filter(|t| t.contains('/') || t.contains('.'))
                .map(clean_candidate)
                .collect::<Vec<_>>()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_candidate(token: &str) -> String {
    token
        .trim_matches(|c: char| matches!(c, '`' | '"' | '\'' | '.' | ',' | ';' | ':' | '?' | ')' | '('))
        .to_string()
}

/// Accept a candidate iff it plausibly names a repository file and does not
/// hit the false-positive denylist.
pub fn is_accepted_path(candidate: &str) -> bool {
    let c = candidate.trim();
    if c.is_empty() || c.len() > 200 {
        return false;
    }
    // Denylist: URLs, www names, bare domains, placeholder files
    let lower = c.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("ftp://")
    {
        return false;
    }
    if lower.starts_with("www.") {
        return false;
    }
    if DOMAIN_REGEX.is_match(c) {
        return false;
    }
    let stem = c
        .rsplit('/')
        .next()
        .unwrap_or(c)
        .split('.')
        .next()
        .unwrap_or("");
    if stem.eq_ignore_ascii_case("example") {
        return false;
    }
    // Must look like a file: recognized extension, or path-like
    has_code_extension(c) || c.contains('/') || c.contains('.')
}

fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= 120 {
        flat
    } else {
        let mut cut: String = flat.chars().take(120).collect();
        cut.push('…');
        cut
    }
}
