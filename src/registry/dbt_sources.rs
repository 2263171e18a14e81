use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{atomic_write_yaml, UpsertOutcome};
use crate::adapter::{AttributeKind, ColumnMapping};
use crate::error::Result;

/// Name of the single source block the pipeline reads raw tables from.
pub const RAW_SOURCE_BLOCK: &str = "raw";

/// The dbt `sources.yml` document: which warehouse tables are readable as
/// sources, plus column-presence checks for generated staging models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesManifest {
    pub version: u32,
    #[serde(default)]
    pub sources: Vec<SourceBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBlock {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub tables: Vec<TableRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBlock {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ModelColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<String>,
}

impl Default for SourcesManifest {
    fn default() -> Self {
        Self {
            version: 2,
            sources: Vec::new(),
            models: Vec::new(),
        }
    }
}

impl SourcesManifest {
    /// Load the manifest, treating a missing or blank file as empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let manifest: SourcesManifest = serde_yaml::from_str(&contents)?;
        Ok(manifest)
    }

    fn raw_block_index(&mut self) -> (usize, bool) {
        if let Some(idx) = self.sources.iter().position(|s| s.name == RAW_SOURCE_BLOCK) {
            return (idx, false);
        }
        self.sources.push(SourceBlock {
            name: RAW_SOURCE_BLOCK.to_string(),
            database: None,
            schema: None,
            tables: Vec::new(),
        });
        (self.sources.len() - 1, true)
    }
}

/// What one manifest merge should ensure for a newly registered dataset.
#[derive(Debug, Clone)]
pub struct ManifestEntry<'a> {
    pub table_name: &'a str,
    pub model_name: &'a str,
    pub database: &'a str,
    pub schema: &'a str,
    pub mapping: &'a ColumnMapping,
}

/// Ensure the `raw` source block declares `table_name` and that a minimal
/// column-presence model entry exists for `model_name`.
///
/// Connection coordinates are filled only when absent; a manually edited
/// `database` or `schema` is never overwritten. Safe to run repeatedly.
pub fn upsert_manifest(path: &Path, entry: &ManifestEntry<'_>) -> Result<UpsertOutcome> {
    let mut manifest = SourcesManifest::load(path)?;

    let (idx, mut changed) = manifest.raw_block_index();
    let source = &mut manifest.sources[idx];

    if source.database.is_none() {
        source.database = Some(entry.database.to_string());
        changed = true;
    }
    if source.schema.is_none() {
        source.schema = Some(entry.schema.to_string());
        changed = true;
    }

    let table_added = !source.tables.iter().any(|t| t.name == entry.table_name);
    if table_added {
        source.tables.push(TableRef {
            name: entry.table_name.to_string(),
        });
        changed = true;
    }

    if !manifest.models.iter().any(|m| m.name == entry.model_name) {
        manifest.models.push(model_checks(entry.model_name, entry.mapping));
        changed = true;
    }

    if changed {
        info!(table = entry.table_name, path = %path.display(), "updating dbt sources manifest");
        atomic_write_yaml(path, &manifest)?;
    } else {
        debug!(table = entry.table_name, "dbt sources manifest already up to date");
    }

    Ok(if table_added {
        UpsertOutcome::Added
    } else {
        UpsertOutcome::Skipped
    })
}

/// Minimal column checks for a generated model: every mapped canonical
/// column is declared, identifiers additionally get a not_null test.
fn model_checks(model_name: &str, mapping: &ColumnMapping) -> ModelBlock {
    let columns = mapping
        .iter()
        .map(|col| ModelColumn {
            name: col.canonical.clone(),
            tests: if col.kind == AttributeKind::Identifier {
                vec!["not_null".to_string()]
            } else {
                Vec::new()
            },
        })
        .collect();
    ModelBlock {
        name: model_name.to_string(),
        columns,
    }
}
