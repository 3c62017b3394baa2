//! Content-blob scanning: locate one file's text inside the concatenated
//! snapshot blob.
//!
//! The blob is a sequence of file sections, each introduced by a header line.
//! Several header conventions are recognized (different snapshot generators
//! emit different ones); a line terminates the current section only when it
//! matches one of the exact header regexes, so ordinary content lines that
//! merely resemble headers do not end a file early. The `#`-heading and
//! `name:` suffix forms additionally require a path-like token (contains `/`
//! or `.`) — a prose markdown heading inside a README body is not a header.
//!
//! Extraction is a single linear scan; there is no parse tree.

use regex::Regex;
use std::sync::LazyLock;

use super::path::normalize_path;

// Compile header regexes once using LazyLock
static FILE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:FILE|File): (.+?)\s*$").unwrap());

static HASH_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,3} (\S+)\s*$").unwrap());

static COLON_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\S+):$").unwrap());

/// Return the path a line introduces, if the line is a file header.
pub fn match_header(line: &str) -> Option<String> {
    if let Some(cap) = FILE_HEADER.captures(line) {
        return Some(normalize_path(&cap[1]));
    }
    if let Some(cap) = HASH_HEADER.captures(line) {
        let token = &cap[1];
        if is_path_like(token) {
            return Some(normalize_path(token));
        }
        return None;
    }
    if let Some(cap) = COLON_HEADER.captures(line) {
        let token = &cap[1];
        // `key:` lines are everywhere in YAML and prose; only a path-like
        // token counts, and URLs (scheme followed by `//`) never do.
        if is_path_like(token) && !token.contains("//") {
            return Some(normalize_path(token));
        }
    }
    None
}

fn is_path_like(token: &str) -> bool {
    token.contains('/') || token.contains('.')
}

/// Extract one file's content from the blob, or `None` if no header matches
/// the (normalized) path.
pub fn extract_file(blob: &str, path: &str) -> Option<String> {
    let target = normalize_path(path);
    if target.is_empty() {
        return None;
    }

    let mut collected: Vec<&str> = Vec::new();
    let mut in_target = false;

    for line in blob.lines() {
        match match_header(line) {
            Some(header_path) if header_path == target && !in_target => {
                in_target = true;
            }
            Some(_) if in_target => break,
            _ => {
                if in_target {
                    collected.push(line);
                }
            }
        }
    }

    if !in_target {
        return None;
    }
    Some(tidy_section(&collected))
}

/// Trim blank padding lines and unwrap a single enclosing code fence, if the
/// whole section is fenced. Fences inside the body are preserved.
fn tidy_section(lines: &[&str]) -> String {
    let mut start = 0;
    let mut end = lines.len();
    while start < end && lines[start].trim().is_empty() {
        start += 1;
    }
    while end > start && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    let mut body = &lines[start..end];

    if body.len() >= 2
        && body[0].trim_start().starts_with("```")
        && body[body.len() - 1].trim() == "```"
    {
        body = &body[1..body.len() - 1];
    }

    body.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_header_file_conventions() {
        assert_eq!(match_header("FILE: src/main.py"), Some("src/main.py".into()));
        assert_eq!(match_header("File: src/main.py"), Some("src/main.py".into()));
    }

    #[test]
    fn test_match_header_hash_conventions() {
        assert_eq!(match_header("# src/main.py"), Some("src/main.py".into()));
        assert_eq!(match_header("## src/main.py"), Some("src/main.py".into()));
        assert_eq!(match_header("### setup.py"), Some("setup.py".into()));
    }

    #[test]
    fn test_match_header_colon_suffix() {
        assert_eq!(match_header("src/main.py:"), Some("src/main.py".into()));
    }

    #[test]
    fn test_prose_headings_are_not_headers() {
        // No path-like token: ordinary markdown headings
        assert_eq!(match_header("# Introduction"), None);
        assert_eq!(match_header("## Getting Started Guide"), None);
        // Multi-word heading cannot match the single-token form
        assert_eq!(match_header("# My main.py walkthrough"), None);
    }

    #[test]
    fn test_yaml_keys_and_urls_are_not_headers() {
        assert_eq!(match_header("version:"), None);
        assert_eq!(match_header("https://example.com/a.py:"), None);
    }

    #[test]
    fn test_loose_prefixes_are_not_headers() {
        assert_eq!(match_header("FILE:src/main.py"), None);
        assert_eq!(match_header("  FILE: src/main.py"), None);
        assert_eq!(match_header("#### four.py"), None);
    }

    #[test]
    fn test_extract_simple() {
        let blob = "FILE: a.py\nprint('a')\n\nFILE: b.py\nprint('b')\n";
        assert_eq!(extract_file(blob, "a.py"), Some("print('a')".into()));
        assert_eq!(extract_file(blob, "b.py"), Some("print('b')".into()));
    }

    #[test]
    fn test_extract_no_bleed_between_adjacent_files() {
        let blob = "FILE: a.py\nline a1\nline a2\nFILE: b.py\nline b1\n";
        let a = extract_file(blob, "a.py").unwrap();
        let b = extract_file(blob, "b.py").unwrap();
        assert!(a.contains("line a1") && a.contains("line a2"));
        assert!(!a.contains("line b1"));
        assert!(!b.contains("line a1") && !b.contains("line a2"));
    }

    #[test]
    fn test_extract_mixed_header_conventions() {
        let blob = "## src/main.py\nmain body\n\nsrc/util.py:\nutil body\n";
        assert_eq!(extract_file(blob, "src/main.py"), Some("main body".into()));
        assert_eq!(extract_file(blob, "./src/util.py"), Some("util body".into()));
    }

    #[test]
    fn test_extract_unwraps_enclosing_fence() {
        let blob = "FILE: a.py\n```python\nprint('a')\n```\nFILE: b.py\nbeta\n";
        assert_eq!(extract_file(blob, "a.py"), Some("print('a')".into()));
    }

    #[test]
    fn test_extract_preserves_inner_fences() {
        let blob = "FILE: doc.md\nIntro\n```rust\nfn main() {}\n```\nOutro\nFILE: next.md\nn\n";
        let content = extract_file(blob, "doc.md").unwrap();
        assert_eq!(content, "Intro\n```rust\nfn main() {}\n```\nOutro");
    }

    #[test]
    fn test_extract_content_with_header_lookalikes() {
        // A prose heading inside file content must not terminate the section
        let blob = "FILE: README.md\n# Introduction\nSome text\n## Usage Notes\nMore text\nFILE: next.py\npass\n";
        let content = extract_file(blob, "README.md").unwrap();
        assert!(content.contains("# Introduction"));
        assert!(content.contains("## Usage Notes"));
        assert!(!content.contains("pass"));
    }

    #[test]
    fn test_extract_stops_at_real_header_inside() {
        // A line matching an exact header regex does end the section; exact
        // matching is the only disambiguation
        let blob = "FILE: a.md\nbefore\nFILE: b.md\nafter\n";
        assert_eq!(extract_file(blob, "a.md"), Some("before".into()));
    }

    #[test]
    fn test_extract_missing_path() {
        let blob = "FILE: a.py\nalpha\n";
        assert_eq!(extract_file(blob, "ghost.py"), None);
        assert_eq!(extract_file(blob, ""), None);
    }

    #[test]
    fn test_extract_last_file_runs_to_eof() {
        let blob = "FILE: a.py\nalpha\nFILE: z.py\nlast line 1\nlast line 2\n";
        assert_eq!(extract_file(blob, "z.py"), Some("last line 1\nlast line 2".into()));
    }

    #[test]
    fn test_extract_normalizes_lookup_path() {
        let blob = "FILE: src/main.py\nbody\n";
        assert_eq!(extract_file(blob, "./src/main.py"), Some("body".into()));
        assert_eq!(extract_file(blob, "/src/main.py"), Some("body".into()));
    }
}
