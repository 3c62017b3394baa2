//! Repository path normalization.
//!
//! Every path that enters the virtual store — from a caller, a tree listing,
//! or a content-blob header — goes through `normalize_path` before any
//! lookup, comparison, or cache-key use. The canonical form is
//! forward-slash separated, relative, with no leading `./` and no trailing
//! slash.

/// Normalize a repository-relative path to its canonical form.
pub fn normalize_path(path: &str) -> String {
    let mut p = path.trim().replace('\\', "/");
    while p.starts_with("./") {
        p = p[2..].to_string();
    }
    let p = p.trim_start_matches('/');
    let p = p.trim_end_matches('/');
    // Collapse accidental doubled separators
    let mut out = String::with_capacity(p.len());
    let mut prev_slash = false;
    for ch in p.chars() {
        if ch == '/' {
            if !prev_slash {
                out.push(ch);
            }
            prev_slash = true;
        } else {
            out.push(ch);
            prev_slash = false;
        }
    }
    out
}

/// The final component of a normalized path.
pub fn file_name(path: &str) -> String {
    normalize_path(path)
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
