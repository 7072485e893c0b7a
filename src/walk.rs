//! Source tree walker
//!
//! Enumerates every candidate Go file under a root: `.go` suffix, not a
//! test file, and no ancestor directory that is hidden, `vendor`, or
//! `testdata`. The result is sorted lexicographically by absolute path so
//! the whole run is deterministic.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Directory names skipped during traversal.
fn skip_dir(name: &str) -> bool {
    name.starts_with('.') || name == "vendor" || name == "testdata"
}

/// True for files the transformer should process.
pub fn is_candidate(name: &str) -> bool {
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// Collects all candidate files under `root`, sorted by absolute path.
/// Traversal errors are fatal and carry the directory that failed.
pub fn walk_go_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_dir(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::Walk {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::Walk {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };

        if path.is_dir() {
            if !skip_dir(&name) {
                walk_dir(&path, files)?;
            }
        } else if is_candidate(&name) {
            files.push(path);
        }
    }

    Ok(())
}
