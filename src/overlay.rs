//! Overlay manifest
//!
//! The overlay is the JSON document consumed by `go build -overlay`: a
//! single `Replace` object mapping absolute original paths to absolute
//! shadow paths. It is accumulated in memory across the run and written
//! exactly once at the end — an empty overlay writes nothing.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the manifest file inside the cache directory.
pub const OVERLAY_FILE: &str = "overlay.json";

/// The `go build -overlay` JSON format.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(rename = "Replace")]
    pub replace: BTreeMap<String, String>,
}

impl Overlay {
    pub fn new() -> Overlay {
        Overlay::default()
    }

    pub fn is_empty(&self) -> bool {
        self.replace.is_empty()
    }

    pub fn len(&self) -> usize {
        self.replace.len()
    }

    /// Registers one original → shadow mapping.
    pub fn insert(&mut self, original: &Path, shadow: &Path) {
        self.replace.insert(
            original.display().to_string(),
            shadow.display().to_string(),
        );
    }

    /// Serializes the manifest under `cache_dir`, reporting the mapping
    /// count on stderr. No-op for an empty overlay.
    pub fn write(&self, cache_dir: &Path) -> Result<Option<PathBuf>> {
        if self.is_empty() {
            return Ok(None);
        }
        let path = cache_dir.join(OVERLAY_FILE);
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        std::fs::write(&path, data).map_err(|e| crate::error::Error::Write {
            path: path.clone(),
            source: e,
        })?;
        eprintln!(
            "gird: overlay written to {} ({} file(s) mapped)",
            path.display(),
            self.len()
        );
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_overlay_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let overlay = Overlay::new();
        assert_eq!(overlay.write(temp.path()).unwrap(), None);
        assert!(!temp.path().join(OVERLAY_FILE).exists());
    }

    #[test]
    fn round_trips_as_replace_object() {
        let temp = TempDir::new().unwrap();
        let mut overlay = Overlay::new();
        overlay.insert(Path::new("/src/main.go"), Path::new("/cache/main_ab.go"));

        let path = overlay.write(temp.path()).unwrap().expect("manifest path");
        let data = std::fs::read_to_string(path).unwrap();
        assert!(data.starts_with("{\n  \"Replace\": {"));
        assert!(data.ends_with("\n"));

        let parsed: Overlay = serde_json::from_str(&data).unwrap();
        assert_eq!(
            parsed.replace.get("/src/main.go").map(String::as_str),
            Some("/cache/main_ab.go")
        );
    }

    #[test]
    fn keys_are_sorted() {
        let mut overlay = Overlay::new();
        overlay.insert(Path::new("/b.go"), Path::new("/sb.go"));
        overlay.insert(Path::new("/a.go"), Path::new("/sa.go"));
        let json = serde_json::to_string(&overlay).unwrap();
        assert!(json.find("/a.go").unwrap() < json.find("/b.go").unwrap());
    }
}
