//! Orchestrates one dataset integration: analyze the CSV, derive names,
//! register the source, write the staging model, and update the dbt
//! manifest. Structural input errors abort before any configuration file
//! is touched; duplicate registrations are reported skips.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapter::{self, AliasTable, DatasetProfile, StagingModel};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::registry::{self, ManifestEntry, RawSourceRecord, RawSourcesFile, UpsertOutcome};

/// Derived names for one dataset: table stem, raw source, staging model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetNames {
    pub table_name: String,
    pub source_name: String,
    pub model_name: String,
}

impl DatasetNames {
    /// Derive names from the CSV file stem: lower-cased, with `-` and
    /// spaces replaced by `_`.
    pub fn from_csv_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table_name = stem.to_lowercase().replace('-', "_").replace(' ', "_");
        let source_name = format!("{table_name}_raw");
        let model_name = format!("stg_{table_name}");
        Self {
            table_name,
            source_name,
            model_name,
        }
    }
}

/// Summary of one `add` run, for the CLI to print.
#[derive(Debug)]
pub struct IntegrationReport {
    pub profile: DatasetProfile,
    pub names: DatasetNames,
    pub row_count: usize,
    pub staging_path: PathBuf,
    pub registry_outcome: UpsertOutcome,
    pub manifest_outcome: UpsertOutcome,
    pub backup_path: Option<PathBuf>,
}

/// Integrates new datasets into the existing Airflow/dbt pipeline tree.
pub struct PipelineIntegrator {
    config: PipelineConfig,
    aliases: AliasTable,
}

impl PipelineIntegrator {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            aliases: AliasTable::builtin(),
        }
    }

    pub fn with_aliases(config: PipelineConfig, aliases: AliasTable) -> Self {
        Self { config, aliases }
    }

    /// Integrate one dataset end to end.
    pub fn add_dataset(
        &self,
        csv_path: &Path,
        project_id: &str,
        dataset_id: &str,
        create_backup: bool,
    ) -> Result<IntegrationReport> {
        let csv_path = self.config.resolve_csv_path(csv_path);

        // Analysis is read-only and fails fast, before any config mutation.
        let profile = adapter::analyze(&csv_path, &self.aliases)?;
        let row_count = adapter::count_rows(&csv_path)?;
        let names = DatasetNames::from_csv_path(&csv_path);
        info!(
            dataset = %names.table_name,
            kind = %profile.kind,
            mapped = profile.mapping.len(),
            "integrating dataset"
        );

        let backup_path = if create_backup {
            self.backup_raw_sources()?
        } else {
            None
        };

        // The registry entry points at the pipeline's data directory, where
        // the loader expects the file to be staged.
        let file_name = csv_path.file_name().unwrap_or(csv_path.as_os_str());
        let staged_csv = self.config.data_dir().join(file_name);
        let record = RawSourceRecord::new(
            &names.source_name,
            project_id,
            dataset_id,
            &names.source_name,
            staged_csv.to_string_lossy(),
        );
        let registry_outcome =
            registry::upsert_raw_source(&self.config.raw_sources_file(), record)?;

        let model = StagingModel::synthesize(&names.model_name, &names.source_name, &profile.mapping);
        let staging_path = self.config.staging_dir().join(format!("{}.sql", model.name));
        registry::atomic_write(&staging_path, model.sql.as_bytes())?;
        info!(model = %model.name, path = %staging_path.display(), "wrote staging model");

        let manifest_outcome = registry::upsert_manifest(
            &self.config.dbt_sources_file(),
            &ManifestEntry {
                table_name: &names.source_name,
                model_name: &names.model_name,
                database: project_id,
                schema: dataset_id,
                mapping: &profile.mapping,
            },
        )?;

        Ok(IntegrationReport {
            profile,
            names,
            row_count,
            staging_path,
            registry_outcome,
            manifest_outcome,
            backup_path,
        })
    }

    /// Registered datasets, in registration order. A missing registry is an
    /// empty pipeline, not an error.
    pub fn list_datasets(&self) -> Result<Vec<RawSourceRecord>> {
        let file = RawSourcesFile::load(&self.config.raw_sources_file())?;
        Ok(file.raw_sources)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn backup_raw_sources(&self) -> Result<Option<PathBuf>> {
        let file = self.config.raw_sources_file();
        if !file.exists() {
            return Ok(None);
        }
        let backup = file.with_extension("yml.backup");
        fs::copy(&file, &backup)?;
        info!(backup = %backup.display(), "backed up raw-source registry");
        Ok(Some(backup))
    }
}

/// Artifacts from a standalone `generate` run: the staging model plus a
/// single-entry registry fragment, optionally written to an output
/// directory for manual review.
#[derive(Debug)]
pub struct GeneratedArtifacts {
    pub profile: DatasetProfile,
    pub row_count: usize,
    pub model: StagingModel,
    pub fragment: RawSourcesFile,
    pub written: Vec<PathBuf>,
}

/// Analyze a CSV and emit its staging model and config fragment without
/// touching the pipeline tree.
pub fn generate_artifacts(
    csv_path: &Path,
    project_id: &str,
    dataset_id: &str,
    output_dir: Option<&Path>,
    aliases: &AliasTable,
) -> Result<GeneratedArtifacts> {
    let profile = adapter::analyze(csv_path, aliases)?;
    let row_count = adapter::count_rows(csv_path)?;
    let names = DatasetNames::from_csv_path(csv_path);

    let model = StagingModel::synthesize(&names.model_name, &names.source_name, &profile.mapping);
    let absolute = fs::canonicalize(csv_path)?;
    let fragment = RawSourcesFile {
        raw_sources: vec![RawSourceRecord::new(
            &names.source_name,
            project_id,
            dataset_id,
            &names.source_name,
            absolute.to_string_lossy(),
        )],
    };

    let mut written = Vec::new();
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;

        let sql_path = dir.join(format!("{}.sql", model.name));
        registry::atomic_write(&sql_path, model.sql.as_bytes())?;
        written.push(sql_path);

        let config_path = dir.join(format!("{}_config.yml", names.table_name));
        registry::atomic_write_yaml(&config_path, &fragment)?;
        written.push(config_path);
    }

    Ok(GeneratedArtifacts {
        profile,
        row_count,
        model,
        fragment,
        written,
    })
}
