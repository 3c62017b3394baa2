//! Tree-blob parsing: turn a structural listing into full file paths.
//!
//! Two listing shapes are accepted:
//! - the canonical indented form `SnapshotBuilder` emits (a `.` root line,
//!   four columns per depth level, trailing `/` on directories), optionally
//!   decorated with `tree`-style drawing characters (`│ ├ └ ─` or their
//!   ASCII `| \`-` equivalents)
//! - flat listings where each line is already a full path
//!
//! Directory reconstruction keeps a stack of enclosing directory names keyed
//! by depth; a file line at depth `d` resolves against the first `d` stack
//! entries.

use super::path::normalize_path;

/// Columns per nesting level in indented listings.
const COLUMNS_PER_LEVEL: usize = 4;

/// Parse a tree blob into normalized file paths, in listing order.
pub fn parse_tree(tree: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut stack: Vec<String> = Vec::new();

    for raw_line in tree.lines() {
        let (depth, name) = strip_decoration(raw_line);
        let name = name.trim_end();
        if name.is_empty() || name == "." || name == "./" {
            continue;
        }

        // A flat full-path line: no indentation, contains a separator, and
        // is not a directory marker.
        if depth == 0 && name.contains('/') && !name.ends_with('/') {
            paths.push(normalize_path(name));
            stack.clear();
            continue;
        }

        // An entry at depth d sits inside d-1 enclosing directories.
        stack.truncate(depth.saturating_sub(1));
        if let Some(dir) = name.strip_suffix('/') {
            stack.push(dir.to_string());
        } else {
            let mut full = stack.join("/");
            if !full.is_empty() {
                full.push('/');
            }
            full.push_str(name);
            paths.push(normalize_path(&full));
        }
    }

    paths
}

/// Strip leading indentation and drawing characters, returning the nesting
/// depth and the bare entry name.
fn strip_decoration(line: &str) -> (usize, &str) {
    let mut width = 0usize;
    let mut rest = line;

    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c @ (' ' | '\t')) => {
                width += if c == '\t' { COLUMNS_PER_LEVEL } else { 1 };
                rest = chars.as_str();
            }
            // A vertical guide is one column of indentation, unless dashes
            // follow, in which case it is an ASCII branch connector.
            Some('│' | '|') => {
                let after = chars.as_str();
                if after.starts_with(['─', '-']) {
                    let trimmed = after.trim_start_matches(['─', '-']).trim_start_matches(' ');
                    width += COLUMNS_PER_LEVEL;
                    return (width / COLUMNS_PER_LEVEL, trimmed);
                }
                width += 1;
                rest = after;
            }
            // Branch connectors introduce exactly one more level; the name
            // follows after the run of dashes and a space.
            Some('├' | '└' | '`' | '+') => {
                let after = chars.as_str();
                let trimmed = after.trim_start_matches(['─', '-']).trim_start_matches(' ');
                width += COLUMNS_PER_LEVEL;
                return (width / COLUMNS_PER_LEVEL, trimmed);
            }
            _ => break,
        }
    }

    (width / COLUMNS_PER_LEVEL, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indented_listing() {
        let tree = "\
.
    src/
        app/
            main.py
        util.py
    README.md
";
        assert_eq!(
            parse_tree(tree),
            vec!["src/app/main.py", "src/util.py", "README.md"]
        );
    }

    #[test]
    fn test_parse_drawing_char_listing() {
        let tree = "\
.
├── src/
│   ├── main.py
│   └── util.py
└── README.md
";
        assert_eq!(parse_tree(tree), vec!["src/main.py", "src/util.py", "README.md"]);
    }

    #[test]
    fn test_parse_ascii_drawing_listing() {
        let tree = "\
.
|-- src/
|   `-- main.py
`-- README.md
";
        assert_eq!(parse_tree(tree), vec!["src/main.py", "README.md"]);
    }

    #[test]
    fn test_parse_flat_listing() {
        let tree = "src/main.py\nsrc/util.py\nREADME.md\n";
        // README.md has no separator, so it rides the directory-stack path
        // with an empty stack
        assert_eq!(parse_tree(tree), vec!["src/main.py", "src/util.py", "README.md"]);
    }

    #[test]
    fn test_parse_skips_root_and_blank_lines() {
        let tree = ".\n\n    README.md\n\n";
        assert_eq!(parse_tree(tree), vec!["README.md"]);
    }

    #[test]
    fn test_parse_directories_produce_no_paths() {
        let tree = "\
.
    src/
    docs/
";
        assert!(parse_tree(tree).is_empty());
    }

    #[test]
    fn test_parse_sibling_directories_do_not_nest() {
        let tree = "\
.
    src/
        a.py
    docs/
        guide.md
";
        assert_eq!(parse_tree(tree), vec!["src/a.py", "docs/guide.md"]);
    }

    #[test]
    fn test_parse_deep_pop_back_to_shallow() {
        let tree = "\
.
    a/
        b/
            deep.txt
    top.txt
";
        assert_eq!(parse_tree(tree), vec!["a/b/deep.txt", "top.txt"]);
    }

    #[test]
    fn test_parse_roundtrip_with_builder() {
        use crate::snapshot::SnapshotBuilder;

        let snapshot = SnapshotBuilder::new("octo/widgets", "main")
            .add_file("src/app/main.py", "x")
            .add_file("src/util.py", "y")
            .add_file("docs/guide.md", "z")
            .add_file("README.md", "w")
            .build();

        let mut parsed = parse_tree(&snapshot.tree);
        parsed.sort();
        assert_eq!(
            parsed,
            vec!["README.md", "docs/guide.md", "src/app/main.py", "src/util.py"]
        );
    }
}
