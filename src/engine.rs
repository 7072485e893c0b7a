//! Pipeline driver
//!
//! The engine owns the per-run state: the project root, the cache
//! directory, the overlay accumulated across files, and the per-directory
//! compilation-unit cache. Processing is single-threaded and strictly
//! ordered — directories and files lexicographically, directives by source
//! position — which is the sole source of deterministic output.
//!
//! Per-file state machine: Scan → Classify → Rewrite → Imports → Emit →
//! Registered, with an early exit to Skipped when no directive produced an
//! injected construct. Fatal errors abort the run carrying the offending
//! path; the overlay is only ever written whole, at the end.

use crate::error::{Error, Result};
use crate::generate::{collect_directives, generate_shadow, Shadow};
use crate::overlay::Overlay;
use crate::resolve::Unit;
use crate::walk::walk_go_files;
use sha2::{Digest, Sha256};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the per-project cache directory. Dot-prefixed so the walker
/// never descends into it.
pub const CACHE_DIR: &str = ".gird_cache";

/// Hex digits of the content hash embedded in shadow filenames.
const HASH_LEN: usize = 12;

/// The core processor: scans Go files, parses contract directives, injects
/// assertion code, and produces the overlay for `go build -overlay`.
pub struct Engine {
    pub root: PathBuf,
    pub cache_dir: PathBuf,
    pub overlay: Overlay,
    units: BTreeMap<PathBuf, Unit>,
}

impl Engine {
    pub fn new(root: &Path) -> Engine {
        Engine {
            root: root.to_path_buf(),
            cache_dir: root.join(CACHE_DIR),
            overlay: Overlay::new(),
            units: BTreeMap::new(),
        }
    }

    /// Executes the full pipeline: walk → per-file transform → overlay.
    pub fn run(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir).map_err(|e| Error::Write {
            path: self.cache_dir.clone(),
            source: e,
        })?;

        let files = walk_go_files(&self.root)?;
        for path in files {
            self.process_file(&path)?;
        }

        self.overlay.write(&self.cache_dir)?;
        Ok(())
    }

    /// Transforms a single file; registers a shadow iff at least one
    /// directive yielded an injected construct.
    fn process_file(&mut self, path: &Path) -> Result<()> {
        let abs = absolutize(path)?;
        let dir = abs
            .parent()
            .ok_or_else(|| Error::Other(format!("no parent directory for {}", abs.display())))?
            .to_path_buf();

        // Scan, Classify, Rewrite — all against the cached unit.
        let shadow: Option<Shadow> = {
            let unit = self.unit(&dir)?;
            let file = unit.file(&abs).ok_or_else(|| Error::Parse {
                path: abs.clone(),
                message: "file not found in its compilation unit".into(),
            })?;

            let directives = collect_directives(file);
            if directives.is_empty() {
                None // Skipped
            } else {
                Some(generate_shadow(file, &directives, unit.resolver())?)
            }
        };

        let Some(shadow) = shadow else {
            return Ok(());
        };
        for warning in &shadow.warnings {
            eprintln!("gird: {}", warning);
        }
        if shadow.injected == 0 {
            return Ok(()); // every directive was a no-op
        }

        // Emit: content-addressed shadow in the cache directory.
        let hash = content_hash(&shadow.text);
        let base = abs
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Other(format!("bad file name: {}", abs.display())))?;
        let shadow_path = self.cache_dir.join(format!("{}_{}.go", base, &hash[..HASH_LEN]));
        std::fs::write(&shadow_path, &shadow.text).map_err(|e| Error::Write {
            path: shadow_path.clone(),
            source: e,
        })?;

        // Registered.
        self.overlay.insert(&abs, &absolutize(&shadow_path)?);
        Ok(())
    }

    /// Loads (or returns the cached) compilation unit for a directory.
    fn unit(&mut self, dir: &Path) -> Result<&Unit> {
        match self.units.entry(dir.to_path_buf()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(v) => Ok(v.insert(Unit::load(dir)?)),
        }
    }
}

/// Hex-encoded SHA-256 of the content.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolves a path against the current directory without touching the
/// filesystem (symlinks are preserved, mirroring the paths the walker saw).
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
