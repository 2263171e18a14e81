//! Dataset adapter core: sniff a CSV, detect its originating family, map
//! its columns onto the canonical loan schema, and synthesize the staging
//! model that casts and renames them.

pub mod aliases;
pub mod detect;
pub mod mapping;
pub mod sample;
pub mod staging_sql;

pub use aliases::{AliasTable, AttributeKind, CanonicalAttribute};
pub use detect::DatasetKind;
pub use mapping::{ColumnMapping, MappedColumn};
pub use sample::{count_rows, HeaderSample, SAMPLE_ROWS};
pub use staging_sql::StagingModel;

use std::path::{Path, PathBuf};

use crate::error::{AdapterError, Result};

/// Everything learned from one look at a dataset file.
#[derive(Debug, Clone)]
pub struct DatasetProfile {
    pub csv_path: PathBuf,
    pub kind: DatasetKind,
    pub columns: Vec<String>,
    pub mapping: ColumnMapping,
}

/// Analyze a CSV against an alias table: sample, detect, map. Read-only;
/// fails before any configuration is touched when the input is unreadable.
pub fn analyze(path: &Path, table: &AliasTable) -> Result<DatasetProfile> {
    if !path.exists() {
        return Err(AdapterError::MissingFile(path.to_path_buf()));
    }
    tracing::info!(path = %path.display(), "analyzing dataset");

    let sample = HeaderSample::read(path)?;
    let kind = DatasetKind::detect(&sample.columns);
    let mapping = ColumnMapping::derive(&sample.columns, table);
    tracing::debug!(kind = %kind, mapped = mapping.len(), "dataset analyzed");

    Ok(DatasetProfile {
        csv_path: path.to_path_buf(),
        kind,
        columns: sample.columns,
        mapping,
    })
}
