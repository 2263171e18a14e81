use anyhow::Result;
use std::fs;
use tempfile::tempdir;

use dwh_adapter::adapter::{AliasTable, DatasetKind};
use dwh_adapter::config::PipelineConfig;
use dwh_adapter::error::AdapterError;
use dwh_adapter::integrator::{generate_artifacts, PipelineIntegrator};
use dwh_adapter::registry::{RawSourcesFile, SourcesManifest, UpsertOutcome};

const HOME_CREDIT_CSV: &str = "\
SK_ID_CURR,AMT_CREDIT,DAYS_BIRTH,TARGET
100002,406597.5,-9461,1
100003,1293502.5,-16765,0
100004,135000.0,-19046,0
";

fn pipeline_with_csv(csv_name: &str, contents: &str) -> Result<(tempfile::TempDir, PipelineConfig)> {
    let home = tempdir()?;
    let data_dir = home.path().join("data");
    fs::create_dir_all(&data_dir)?;
    fs::write(data_dir.join(csv_name), contents)?;
    let config = PipelineConfig::with_home(home.path());
    Ok((home, config))
}

#[test]
fn test_add_dataset_end_to_end() -> Result<()> {
    let (_home, config) = pipeline_with_csv("application_train.csv", HOME_CREDIT_CSV)?;
    let integrator = PipelineIntegrator::new(config.clone());

    let report = integrator.add_dataset(
        "data/application_train.csv".as_ref(),
        "demo-project",
        "demo_dataset",
        true,
    )?;

    assert_eq!(report.profile.kind, DatasetKind::HomeCredit);
    assert_eq!(report.row_count, 3);
    assert_eq!(report.names.source_name, "application_train_raw");
    assert_eq!(report.registry_outcome, UpsertOutcome::Added);
    assert_eq!(report.manifest_outcome, UpsertOutcome::Added);
    // First run has nothing to back up.
    assert!(report.backup_path.is_none());

    // Registry entry
    let registry = RawSourcesFile::load(&config.raw_sources_file())?;
    assert_eq!(registry.raw_sources.len(), 1);
    let source = &registry.raw_sources[0];
    assert_eq!(source.name, "application_train_raw");
    assert_eq!(source.table_id, "application_train_raw");
    assert_eq!(source.project_id, "demo-project");
    assert!(source.csv_path.ends_with("data/application_train.csv"));

    // Staging model on disk, with the day-offset rule applied
    let sql = fs::read_to_string(&report.staging_path)?;
    assert!(report
        .staging_path
        .ends_with("dbt/models/staging/stg_application_train.sql"));
    assert!(sql.contains("{{ source('raw', 'application_train_raw') }}"));
    assert!(sql.contains(
        "date_add(current_date(), interval cast(DAYS_BIRTH as int64) day) as date_of_birth"
    ));
    assert!(sql.contains("cast(SK_ID_CURR as string) as customer_id"));

    // Manifest declares the table and the model checks
    let manifest = SourcesManifest::load(&config.dbt_sources_file())?;
    assert_eq!(manifest.version, 2);
    assert_eq!(manifest.sources[0].name, "raw");
    assert_eq!(manifest.sources[0].database.as_deref(), Some("demo-project"));
    assert!(manifest.sources[0]
        .tables
        .iter()
        .any(|t| t.name == "application_train_raw"));
    assert!(manifest.models.iter().any(|m| m.name == "stg_application_train"));

    Ok(())
}

#[test]
fn test_re_adding_is_an_idempotent_skip() -> Result<()> {
    let (_home, config) = pipeline_with_csv("application_train.csv", HOME_CREDIT_CSV)?;
    let integrator = PipelineIntegrator::new(config.clone());

    integrator.add_dataset(
        "data/application_train.csv".as_ref(),
        "demo-project",
        "demo_dataset",
        true,
    )?;
    let registry_before = fs::read_to_string(config.raw_sources_file())?;

    let report = integrator.add_dataset(
        "data/application_train.csv".as_ref(),
        "demo-project",
        "demo_dataset",
        true,
    )?;

    assert_eq!(report.registry_outcome, UpsertOutcome::Skipped);
    assert_eq!(report.manifest_outcome, UpsertOutcome::Skipped);
    // Second run backs up the registry it found.
    assert!(report.backup_path.is_some());

    let registry = RawSourcesFile::load(&config.raw_sources_file())?;
    assert_eq!(registry.raw_sources.len(), 1);
    assert_eq!(
        fs::read_to_string(config.raw_sources_file())?,
        registry_before
    );

    let manifest = SourcesManifest::load(&config.dbt_sources_file())?;
    let tables: Vec<&str> = manifest.sources[0]
        .tables
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(tables, vec!["application_train_raw"]);
    assert_eq!(manifest.models.len(), 1);

    Ok(())
}

#[test]
fn test_manual_manifest_edits_survive_reintegration() -> Result<()> {
    let (_home, config) = pipeline_with_csv("application_train.csv", HOME_CREDIT_CSV)?;
    let integrator = PipelineIntegrator::new(config.clone());

    integrator.add_dataset(
        "data/application_train.csv".as_ref(),
        "demo-project",
        "demo_dataset",
        false,
    )?;

    // An operator pins the manifest to a different database by hand.
    let manifest_path = config.dbt_sources_file();
    let edited = fs::read_to_string(&manifest_path)?.replace("demo-project", "pinned-project");
    fs::write(&manifest_path, edited)?;

    // Re-running with different coordinates must not overwrite the pin.
    integrator.add_dataset(
        "data/application_train.csv".as_ref(),
        "other-project",
        "other_dataset",
        false,
    )?;

    let manifest = SourcesManifest::load(&manifest_path)?;
    assert_eq!(
        manifest.sources[0].database.as_deref(),
        Some("pinned-project")
    );

    Ok(())
}

#[test]
fn test_missing_csv_fails_before_any_mutation() -> Result<()> {
    let home = tempdir()?;
    let config = PipelineConfig::with_home(home.path());
    let integrator = PipelineIntegrator::new(config.clone());

    let err = integrator
        .add_dataset("data/absent.csv".as_ref(), "p", "d", true)
        .unwrap_err();
    assert!(matches!(err, AdapterError::MissingFile(_)));

    // Fail fast: no partial output anywhere.
    assert!(!config.raw_sources_file().exists());
    assert!(!config.dbt_sources_file().exists());
    assert!(!config.staging_dir().exists());

    Ok(())
}

#[test]
fn test_headerless_csv_is_a_format_error() -> Result<()> {
    let (_home, config) = pipeline_with_csv("empty.csv", "")?;
    let integrator = PipelineIntegrator::new(config.clone());

    let err = integrator
        .add_dataset("data/empty.csv".as_ref(), "p", "d", true)
        .unwrap_err();
    assert!(matches!(err, AdapterError::InputFormat(_)));
    assert!(!config.raw_sources_file().exists());

    Ok(())
}

#[test]
fn test_list_datasets() -> Result<()> {
    let (_home, config) = pipeline_with_csv("application_train.csv", HOME_CREDIT_CSV)?;
    let integrator = PipelineIntegrator::new(config);

    // An unconfigured pipeline lists as empty, not as an error.
    assert!(integrator.list_datasets()?.is_empty());

    integrator.add_dataset(
        "data/application_train.csv".as_ref(),
        "demo-project",
        "demo_dataset",
        true,
    )?;

    let sources = integrator.list_datasets()?;
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].name, "application_train_raw");

    Ok(())
}

#[test]
fn test_custom_alias_table_drives_the_mapping() -> Result<()> {
    let (_home, config) = pipeline_with_csv(
        "inhouse_loans.csv",
        "PRINCIPAL,BORROWER_REF\n5000,B-1\n7500,B-2\n",
    )?;
    let aliases = AliasTable::from_yaml(
        "attributes:\n\
         - name: loan_amount\n  kind: numeric\n  aliases: [principal]\n\
         - name: customer_id\n  kind: identifier\n  aliases: [borrower_ref]\n",
    )?;
    let integrator = PipelineIntegrator::with_aliases(config, aliases);

    let report = integrator.add_dataset(
        "data/inhouse_loans.csv".as_ref(),
        "demo-project",
        "demo_dataset",
        false,
    )?;

    assert_eq!(report.profile.kind, DatasetKind::Generic);
    assert_eq!(report.profile.mapping.get("loan_amount"), Some("PRINCIPAL"));

    let sql = fs::read_to_string(&report.staging_path)?;
    assert!(sql.contains("cast(PRINCIPAL as numeric) as loan_amount"));
    assert!(sql.contains("cast(BORROWER_REF as string) as customer_id"));

    Ok(())
}

#[test]
fn test_generate_artifacts_writes_to_output_dir() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = dir.path().join("vehicle-loans.csv");
    fs::write(
        &csv_path,
        "UniqueID,DisbursalDate,disbursed_amount,ltv\n1,31-12-24,50000,85.2\n",
    )?;
    let out_dir = dir.path().join("generated");

    let artifacts = generate_artifacts(
        &csv_path,
        "demo-project",
        "demo_dataset",
        Some(&out_dir),
        &AliasTable::builtin(),
    )?;

    assert_eq!(artifacts.profile.kind, DatasetKind::VehicleLoan);
    assert_eq!(artifacts.model.name, "stg_vehicle_loans");
    assert_eq!(artifacts.written.len(), 2);
    assert!(out_dir.join("stg_vehicle_loans.sql").exists());
    assert!(out_dir.join("vehicle_loans_config.yml").exists());

    let sql = fs::read_to_string(out_dir.join("stg_vehicle_loans.sql"))?;
    assert!(sql.contains(
        "safe.parse_date('%d-%m-%y', cast(DisbursalDate as string)) as application_date"
    ));

    let fragment: RawSourcesFile =
        serde_yaml::from_str(&fs::read_to_string(out_dir.join("vehicle_loans_config.yml"))?)?;
    assert_eq!(fragment.raw_sources[0].name, "vehicle_loans_raw");

    Ok(())
}
