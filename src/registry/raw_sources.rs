use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{atomic_write_yaml, UpsertOutcome};
use crate::error::Result;

/// One ingestible input and its warehouse destination, as stored under the
/// `raw_sources` list in `config/raw_sources.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSourceRecord {
    pub name: String,
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub csv_path: String,
}

impl RawSourceRecord {
    /// Build the registration entry for a resolved source. Pure
    /// construction; the registry upsert decides whether it lands on disk.
    pub fn new(
        name: impl Into<String>,
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
        csv_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
            csv_path: csv_path.into(),
        }
    }
}

/// The raw-source registry document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSourcesFile {
    #[serde(default)]
    pub raw_sources: Vec<RawSourceRecord>,
}

impl RawSourcesFile {
    /// Load the registry, treating a missing or blank file as empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: RawSourcesFile = serde_yaml::from_str(&contents)?;
        Ok(file)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.raw_sources.iter().any(|s| s.name == name)
    }
}

/// Append `record` to the registry at `path` unless an entry with the same
/// logical name already exists. Running twice with identical inputs leaves
/// exactly one entry for that name.
pub fn upsert_raw_source(path: &Path, record: RawSourceRecord) -> Result<UpsertOutcome> {
    let mut file = RawSourcesFile::load(path)?;
    if file.contains(&record.name) {
        warn!(source = %record.name, "source already registered, skipping");
        return Ok(UpsertOutcome::Skipped);
    }

    info!(source = %record.name, path = %path.display(), "registering raw source");
    file.raw_sources.push(record);
    atomic_write_yaml(path, &file)?;
    Ok(UpsertOutcome::Added)
}
