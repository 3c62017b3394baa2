//! Fenced-block and diff extraction.
//!
//! Fenced regions are lifted verbatim and language-tagged: the fence hint
//! wins when present, otherwise keyword heuristics take a guess. A block is
//! flagged as a diff when at least two of its first ten lines begin with an
//! unambiguous `+`/`-` (the `+++`/`---` file headers do not count). Diff
//! blocks decompose into ordered per-line records that reconstruct the
//! original text losslessly: addition/deletion lines drop their one-char
//! prefix, everything else (context, hunk and file headers) is kept
//! verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Compile once; (?s) so bodies may span lines, non-greedy to stop at the
// first closing fence.
static FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```([A-Za-z0-9_+-]*)[ \t]*\n(.*?)```").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub content: String,
    pub language: Option<String>,
    pub is_diff: bool,
    /// Set only on diff blocks: the dominant change direction
    /// ("addition", "deletion", or "mixed").
    pub diff_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineKind {
    Addition,
    Deletion,
    Context,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Deleted,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffBlock {
    pub filename: Option<String>,
    pub diff_lines: Vec<DiffLine>,
    pub change_type: ChangeType,
}

/// Extract every fenced region of the text, in order.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    FENCE_REGEX
        .captures_iter(text)
        .map(|cap| {
            let hint = cap[1].trim();
            let content = cap[2].trim_end_matches('\n').to_string();
            let is_diff = hint == "diff" || looks_like_diff_block(&content);
            let diff_type = is_diff.then(|| dominant_direction(&content));
            let language = if is_diff {
                Some("diff".to_string())
            } else {
                detect_language(hint, &content)
            };
            CodeBlock {
                content,
                language,
                is_diff,
                diff_type,
            }
        })
        .collect()
}

/// A block is a diff iff at least two of its first ten lines start with an
/// unambiguous `+` or `-` (file headers excluded).
pub fn looks_like_diff_block(content: &str) -> bool {
    let marked = content
        .lines()
        .take(10)
        .filter(|l| {
            (l.starts_with('+') && !l.starts_with("+++"))
                || (l.starts_with('-') && !l.starts_with("---"))
        })
        .count();
    marked >= 2
}

fn dominant_direction(content: &str) -> String {
    let mut additions = 0usize;
    let mut deletions = 0usize;
    for line in content.lines() {
        if line.starts_with('+') && !line.starts_with("+++") {
            additions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            deletions += 1;
        }
    }
    if additions > 0 && deletions == 0 {
        "addition".to_string()
    } else if deletions > 0 && additions == 0 {
        "deletion".to_string()
    } else {
        "mixed".to_string()
    }
}

/// Language detection: fence hint first, then keyword heuristics.
fn detect_language(hint: &str, content: &str) -> Option<String> {
    if !hint.is_empty() {
        return Some(hint.to_lowercase());
    }
    let heuristics: &[(&str, fn(&str) -> bool)] = &[
        ("rust", |c| c.contains("fn ") && (c.contains("let ") || c.contains("impl "))),
        ("python", |c| c.contains("def ") || c.contains("import ") && c.contains(":")),
        ("go", |c| c.contains("func ") && c.contains("package ")),
        ("java", |c| c.contains("public class ") || c.contains("public static void")),
        ("javascript", |c| {
            c.contains("function ") || c.contains("const ") || c.contains("=>")
        }),
        ("c", |c| c.contains("#include")),
        ("sql", |c| {
            let upper = c.to_uppercase();
            upper.contains("SELECT ") && upper.contains(" FROM ")
        }),
        ("shell", |c| c.starts_with("#!") || c.lines().any(|l| l.starts_with("$ "))),
        ("html", |c| c.contains("</") && c.contains('>')),
        ("json", |c| {
            let t = c.trim();
            t.starts_with('{') && t.ends_with('}') && t.contains(':')
        }),
    ];
    heuristics
        .iter()
        .find(|(_, probe)| probe(content))
        .map(|(language, _)| language.to_string())
}

/// Decompose a diff into per-line records. Reconstruction rule:
/// `Addition → '+' + content`, `Deletion → '-' + content`,
/// `Context → content` verbatim.
pub fn decompose_diff(content: &str) -> Vec<DiffLine> {
    content
        .lines()
        .map(|line| {
            if line.starts_with('+') && !line.starts_with("+++") {
                DiffLine {
                    kind: DiffLineKind::Addition,
                    content: line[1..].to_string(),
                }
            } else if line.starts_with('-') && !line.starts_with("---") {
                DiffLine {
                    kind: DiffLineKind::Deletion,
                    content: line[1..].to_string(),
                }
            } else {
                DiffLine {
                    kind: DiffLineKind::Context,
                    content: line.to_string(),
                }
            }
        })
        .collect()
}

/// Re-join per-line records into diff text (inverse of `decompose_diff`).
pub fn recompose_diff(lines: &[DiffLine]) -> String {
    lines
        .iter()
        .map(|line| match line.kind {
            DiffLineKind::Addition => format!("+{}", line.content),
            DiffLineKind::Deletion => format!("-{}", line.content),
            DiffLineKind::Context => line.content.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split diff text into per-file blocks using the `---`/`+++` headers.
/// `/dev/null` on the old side means the file was added, on the new side
/// deleted; anything else is a modification.
pub fn extract_diff_blocks(text: &str) -> Vec<DiffBlock> {
    let mut diff_sources: Vec<String> = Vec::new();
    let fenced = extract_code_blocks(text);
    let mut any_fenced_diff = false;
    for block in &fenced {
        if block.is_diff {
            diff_sources.push(block.content.clone());
            any_fenced_diff = true;
        }
    }
    if !any_fenced_diff && super::classify::looks_like_diff(text) {
        diff_sources.push(text.to_string());
    }

    let mut blocks = Vec::new();
    for source in diff_sources {
        blocks.extend(split_per_file(&source));
    }
    blocks
}

fn split_per_file(diff: &str) -> Vec<DiffBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut old_path: Option<String> = None;
    let mut new_path: Option<String> = None;
    let mut seen_header = false;

    let finalize = |lines: &[&str],
                    old_path: &Option<String>,
                    new_path: &Option<String>,
                    blocks: &mut Vec<DiffBlock>| {
        if lines.is_empty() {
            return;
        }
        let old_null = old_path.as_deref() == Some("/dev/null");
        let new_null = new_path.as_deref() == Some("/dev/null");
        let change_type = if old_null {
            ChangeType::Added
        } else if new_null {
            ChangeType::Deleted
        } else {
            ChangeType::Modified
        };
        let filename = if new_null {
            old_path.clone()
        } else {
            new_path.clone().or_else(|| old_path.clone())
        }
        .filter(|p| p != "/dev/null");
        blocks.push(DiffBlock {
            filename,
            diff_lines: decompose_diff(&lines.join("\n")),
            change_type,
        });
    };

    for line in diff.lines() {
        if let Some(path) = line.strip_prefix("--- ") {
            if seen_header {
                finalize(&current, &old_path, &new_path, &mut blocks);
                current.clear();
                new_path = None;
            }
            old_path = Some(strip_diff_prefix(path));
            seen_header = true;
        } else if let Some(path) = line.strip_prefix("+++ ") {
            new_path = Some(strip_diff_prefix(path));
        }
        current.push(line);
    }
    finalize(&current, &old_path, &new_path, &mut blocks);
    blocks
}

fn strip_diff_prefix(path: &str) -> String {
    let path = path.trim();
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DIFF: &str = "\
--- a/src/main.py
+++ b/src/main.py
@@ -1,3 +1,3 @@
 def main():
-    return 0
+    return 1
";

    #[test]
    fn test_extract_single_block_with_hint() {
        let text = "Before\n```python\nprint('hi')\n```\nAfter";
        let blocks = extract_code_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "print('hi')");
        assert_eq!(blocks[0].language.as_deref(), Some("python"));
        assert!(!blocks[0].is_diff);
        assert!(blocks[0].diff_type.is_none());
    }

    #[test]
    fn test_extract_multiple_blocks_in_order() {
        let text = "```rust\nfn a() { let x = 1; }\n```\ntext\n```\ndef b():\n    pass\n```";
        let blocks = extract_code_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language.as_deref(), Some("rust"));
        assert_eq!(blocks[1].language.as_deref(), Some("python"));
    }

    #[test]
    fn test_language_heuristics_without_hint() {
        let js = extract_code_blocks("```\nconst x = () => 1;\n```");
        assert_eq!(js[0].language.as_deref(), Some("javascript"));
        let c = extract_code_blocks("```\n#include <stdio.h>\n```");
        assert_eq!(c[0].language.as_deref(), Some("c"));
        let unknown = extract_code_blocks("```\n???\n```");
        assert_eq!(unknown[0].language, None);
    }

    #[test]
    fn test_diff_detection_inside_fence() {
        let text = format!("```diff\n{}```", SAMPLE_DIFF);
        let blocks = extract_code_blocks(&text);
        assert!(blocks[0].is_diff);
        assert_eq!(blocks[0].language.as_deref(), Some("diff"));
        assert_eq!(blocks[0].diff_type.as_deref(), Some("mixed"));
    }

    #[test]
    fn test_diff_detection_without_hint() {
        let text = format!("```\n{}```", SAMPLE_DIFF);
        let blocks = extract_code_blocks(&text);
        assert!(blocks[0].is_diff);
    }

    #[test]
    fn test_file_headers_do_not_count_as_diff_markers() {
        // Only the two header lines carry +/-; not enough to call it a diff
        let content = "```\n--- a/x.py\n+++ b/x.py\nno hunks here\n```";
        let blocks = extract_code_blocks(content);
        assert!(!blocks[0].is_diff);
    }

    #[test]
    fn test_decompose_kinds() {
        let lines = decompose_diff(SAMPLE_DIFF.trim_end());
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0].kind, DiffLineKind::Context); // --- header
        assert_eq!(lines[1].kind, DiffLineKind::Context); // +++ header
        assert_eq!(lines[2].kind, DiffLineKind::Context); // @@ hunk
        assert_eq!(lines[3].kind, DiffLineKind::Context);
        assert_eq!(lines[4].kind, DiffLineKind::Deletion);
        assert_eq!(lines[4].content, "    return 0");
        assert_eq!(lines[5].kind, DiffLineKind::Addition);
        assert_eq!(lines[5].content, "    return 1");
    }

    #[test]
    fn test_decompose_recompose_is_lossless() {
        let original = SAMPLE_DIFF.trim_end();
        assert_eq!(recompose_diff(&decompose_diff(original)), original);
    }

    #[test]
    fn test_decompose_recompose_lossless_with_odd_lines() {
        let original = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n-old\n+new\n no-newline marker\n\\ No newline at end of file";
        assert_eq!(recompose_diff(&decompose_diff(original)), original);
    }

    #[test]
    fn test_extract_diff_blocks_single_file() {
        let text = format!("Here is the change:\n```diff\n{}```", SAMPLE_DIFF);
        let blocks = extract_diff_blocks(&text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].filename.as_deref(), Some("src/main.py"));
        assert_eq!(blocks[0].change_type, ChangeType::Modified);
    }

    #[test]
    fn test_extract_diff_blocks_multiple_files() {
        let diff = "\
--- a/one.py
+++ b/one.py
@@ -1 +1 @@
-a
+b
--- a/two.py
+++ b/two.py
@@ -1 +1 @@
-c
+d
";
        let blocks = extract_diff_blocks(&format!("```diff\n{}```", diff));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].filename.as_deref(), Some("one.py"));
        assert_eq!(blocks[1].filename.as_deref(), Some("two.py"));
    }

    #[test]
    fn test_extract_diff_blocks_added_and_deleted_files() {
        let added = "--- /dev/null\n+++ b/new.py\n@@ -0,0 +1 @@\n+hello\n";
        let blocks = extract_diff_blocks(&format!("```diff\n{}```", added));
        assert_eq!(blocks[0].change_type, ChangeType::Added);
        assert_eq!(blocks[0].filename.as_deref(), Some("new.py"));

        let deleted = "--- a/gone.py\n+++ /dev/null\n@@ -1 +0,0 @@\n-bye\n";
        let blocks = extract_diff_blocks(&format!("```diff\n{}```", deleted));
        assert_eq!(blocks[0].change_type, ChangeType::Deleted);
        assert_eq!(blocks[0].filename.as_deref(), Some("gone.py"));
    }

    #[test]
    fn test_extract_diff_blocks_from_bare_text() {
        // An unfenced diff still yields blocks
        let blocks = extract_diff_blocks(SAMPLE_DIFF);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].filename.as_deref(), Some("src/main.py"));
    }

    #[test]
    fn test_no_diff_blocks_in_plain_text() {
        assert!(extract_diff_blocks("just words, nothing else").is_empty());
    }
}
