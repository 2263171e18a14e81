//! Idempotent config mergers for the pipeline's registry documents.
//!
//! Both mergers follow the same shape: load the document into a value
//! (missing file means empty document), transform the value, then replace
//! the file atomically. A merge either rewrites the whole file or leaves
//! the original untouched.

pub mod dbt_sources;
pub mod raw_sources;

pub use dbt_sources::{upsert_manifest, ManifestEntry, SourcesManifest};
pub use raw_sources::{upsert_raw_source, RawSourceRecord, RawSourcesFile};

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Whether an upsert changed the document or found the entry already there.
/// A skip is a reported no-op, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Skipped,
}

impl UpsertOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, UpsertOutcome::Added)
    }
}

/// Serialize a document to YAML and atomically replace `path` with it.
pub fn atomic_write_yaml<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(document)?;
    atomic_write(path, yaml.as_bytes())
}

/// Atomically write raw bytes: write a `.tmp` sibling, then rename over the
/// target. Creates parent directories as needed.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("nested").join("file.yml");
        atomic_write(&path, b"raw_sources: []\n").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_tmp_residue() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.yml");
        atomic_write(&path, b"version: 2\n").unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "version: 2\n");
    }

    #[test]
    fn test_atomic_write_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.yml");
        atomic_write(&path, b"old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
