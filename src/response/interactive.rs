//! Interactive-element detection.
//!
//! Prompts the assistant aims at a human ("Would you like…", numbered
//! option lists, "which file should I…") become declarative UI descriptors
//! a frontend can render as buttons or pickers, instead of being left as
//! prose.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Declarative description of one UI element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveElement {
    /// "multiple_choice", "yes_no", or "file_selection".
    pub element_type: String,
    /// The question or heading the element answers.
    pub label: String,
    pub options: Vec<String>,
    /// Action identifier for the frontend ("select_option", "confirm",
    /// "select_file").
    pub action: String,
}

static NUMBERED_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)[.)]\s+(.+?)\s*$").unwrap());

static YES_NO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:would you like|do you want|should i|shall i)\b[^?\n]*\?").unwrap()
});

static FILE_SELECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:which file|select (?:a|the) file|choose (?:a|the) file)\b[^?\n]*\??")
        .unwrap()
});

static PATHISH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[`]?([\w./-]+/[\w./-]+|[\w-]+\.\w{1,8})[`]?").unwrap());

/// Detect all interactive elements in a response.
pub fn extract_interactive_elements(text: &str) -> Vec<InteractiveElement> {
    let mut elements = Vec::new();

    if let Some(choice) = detect_multiple_choice(text) {
        elements.push(choice);
    }
    if let Some(file_select) = detect_file_selection(text) {
        elements.push(file_select);
    }
    for question in detect_yes_no(text) {
        // A question already represented as a choice/selection label does
        // not also become a yes/no button pair
        if elements.iter().any(|e| e.label == question) {
            continue;
        }
        elements.push(InteractiveElement {
            element_type: "yes_no".to_string(),
            label: question,
            options: vec!["Yes".to_string(), "No".to_string()],
            action: "confirm".to_string(),
        });
    }
    elements
}

/// Two or more consecutive numbered lines form a multiple-choice prompt; the
/// label is the nearest preceding question line, if any.
fn detect_multiple_choice(text: &str) -> Option<InteractiveElement> {
    let lines: Vec<&str> = text.lines().collect();
    let mut options = Vec::new();
    let mut first_option_line = None;

    for (i, line) in lines.iter().enumerate() {
        if let Some(cap) = NUMBERED_OPTION.captures(line) {
            if options.is_empty() {
                first_option_line = Some(i);
            }
            options.push(cap[2].to_string());
        } else if !options.is_empty() && !line.trim().is_empty() {
            break;
        }
    }
    if options.len() < 2 {
        return None;
    }

    let label = first_option_line
        .and_then(|start| {
            lines[..start]
                .iter()
                .rev()
                .find(|l| l.trim().ends_with('?') || l.trim().ends_with(':'))
                .map(|l| l.trim().to_string())
        })
        .unwrap_or_else(|| "Choose an option".to_string());

    Some(InteractiveElement {
        element_type: "multiple_choice".to_string(),
        label,
        options,
        action: "select_option".to_string(),
    })
}

fn detect_yes_no(text: &str) -> Vec<String> {
    YES_NO
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

fn detect_file_selection(text: &str) -> Option<InteractiveElement> {
    let question = FILE_SELECTION.find(text)?;
    // Offer the path-like tokens mentioned after the question as options
    let tail = &text[question.end()..];
    let options: Vec<String> = PATHISH_TOKEN
        .captures_iter(tail)
        .map(|cap| cap[1].to_string())
        .take(10)
        .collect();
    Some(InteractiveElement {
        element_type: "file_selection".to_string(),
        label: question.as_str().trim().to_string(),
        options,
        action: "select_file".to_string(),
    })
}
