//! Recursive pattern search over a directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{ComposterError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Find every entry matching `pattern` in its directory and all directories
/// below it.
///
/// `pattern` is a path whose last component is a shell glob
/// (`/repo/src/*.rs`). Results are ordered depth-first: the matches of a
/// directory (sorted by name) come before those of its subdirectories, which
/// are visited in name order. Hidden directories are not entered, and neither
/// is any `<root>/<excluded>` directory.
pub fn recursive_glob(pattern: &Path, root: &Path, excluded: &[String]) -> Result<Vec<PathBuf>> {
    let base = pattern
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ComposterError::Configuration(format!("invalid glob pattern: {}", pattern.display()))
        })?;
    let matcher = Pattern::new(base)
        .map_err(|e| ComposterError::Configuration(format!("invalid glob pattern '{base}': {e}")))?;

    let start = match pattern.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let skip: Vec<PathBuf> = excluded.iter().map(|d| root.join(d)).collect();

    let mut found = Vec::new();
    walk(&start, &matcher, &skip, &mut found)?;
    Ok(found)
}

fn walk(dir: &Path, matcher: &Pattern, skip: &[PathBuf], found: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<(String, PathBuf, bool)> = match fs::read_dir(dir) {
        Ok(rd) => rd
            .filter_map(|e| e.ok())
            .map(|e| {
                let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
                (e.file_name().to_string_lossy().into_owned(), e.path(), is_dir)
            })
            .collect(),
        // Unreadable or missing directories contribute nothing.
        Err(_) => return Ok(()),
    };
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, path, _) in &entries {
        if matcher.matches_with(name, MATCH_OPTIONS) {
            found.push(path.clone());
        }
    }

    for (name, path, is_dir) in &entries {
        if !is_dir || name.starts_with('.') || skip.iter().any(|s| s == path) {
            continue;
        }
        walk(path, matcher, skip, found)?;
    }

    Ok(())
}
