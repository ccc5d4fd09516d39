//! Key, name and filter utilities

use std::path::Path;

/// Object key for an item: `{label}/{base_name}`.
pub fn destination_key(label: &str, base_name: &str) -> String {
    format!("{label}/{base_name}")
}

/// Final path component, or None for paths like `/` or `..` and for names that are not
/// valid UTF-8. Never lossy: two distinct names must never map to the same key.
pub fn base_name(path: &Path) -> Option<String> {
    path.file_name()?.to_str().map(str::to_owned)
}

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(name: &str) -> bool {
    match name {
        // macOS
        ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
        // Windows
        "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" | "$RECYCLE.BIN" => true,
        // Linux
        ".directory" => true,
        // macOS resource forks, Linux trash dirs
        _ => name.starts_with("._") || name.starts_with(".Trash-"),
    }
}

/// Returns true if a listed file with base name `name` should be uploaded.
pub fn should_include_in_listing(name: &str, exclude_patterns: &[String]) -> bool {
    if is_os_hidden_file(name) {
        return false;
    }
    !exclude_patterns.iter().any(|p| glob_match(p, name))
}

/// Simple glob pattern matching (supports * and ?).
/// Single pass; on mismatch backtracks to the last `*` only, so runtime stays polynomial.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0_usize, 0_usize);
    // (pattern index of the last `*`, text index it is currently matched up to)
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}
