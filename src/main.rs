use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use dwh_adapter::adapter::DatasetProfile;
use dwh_adapter::config::PipelineConfig;
use dwh_adapter::integrator::{self, IntegrationReport, PipelineIntegrator};
use dwh_adapter::logging;
use dwh_adapter::sanitize;

#[derive(Parser)]
#[command(name = "dwh_adapter")]
#[command(about = "Bank DWH demo dataset adapter and pipeline integrator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CSV and integrate it into the pipeline configuration
    Add {
        /// Path to the CSV file (absolute, or relative to the pipeline home)
        csv_path: PathBuf,
        /// GCP project ID for the registered source
        #[arg(long)]
        project_id: Option<String>,
        /// BigQuery dataset ID for the registered source
        #[arg(long)]
        dataset_id: Option<String>,
        /// Skip creating a backup of the existing registry
        #[arg(long)]
        no_backup: bool,
    },
    /// List currently registered datasets
    List,
    /// Analyze a CSV and emit its staging model and config fragment
    /// without touching the pipeline tree
    Generate {
        /// Path to the CSV file
        csv_path: PathBuf,
        /// GCP project ID for the generated config
        #[arg(long)]
        project_id: Option<String>,
        /// BigQuery dataset ID for the generated config
        #[arg(long)]
        dataset_id: Option<String>,
        /// Write artifacts here instead of printing them
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Rewrite a CSV header, replacing '.' with '_' in column names
    CleanHeader {
        /// Source CSV file
        src: PathBuf,
        /// Destination for the cleaned copy
        dst: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = PipelineConfig::load()?;

    match cli.command {
        Commands::Add {
            csv_path,
            project_id,
            dataset_id,
            no_backup,
        } => {
            let project_id = project_id.unwrap_or_else(|| config.project_id.clone());
            let dataset_id = dataset_id.unwrap_or_else(|| config.dataset_id.clone());
            let aliases = config.alias_table()?;
            let integrator = PipelineIntegrator::with_aliases(config, aliases);

            println!("\n{}", "=".repeat(70));
            println!("Adding new dataset: {}", csv_path.display());
            println!("{}\n", "=".repeat(70));

            match integrator.add_dataset(&csv_path, &project_id, &dataset_id, !no_backup) {
                Ok(report) => {
                    print_analysis_report(&report.profile, report.row_count);
                    print_integration_summary(&report, integrator.config());
                }
                Err(e) => {
                    error!("Integration failed: {e}");
                    println!("❌ Integration failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::List => {
            let integrator = PipelineIntegrator::new(config);
            match integrator.list_datasets() {
                Ok(sources) if sources.is_empty() => {
                    println!("No datasets configured yet.");
                }
                Ok(sources) => {
                    println!("\n{}", "=".repeat(70));
                    println!("Configured Datasets ({})", sources.len());
                    println!("{}", "=".repeat(70));
                    for (i, source) in sources.iter().enumerate() {
                        println!("\n{}. {}", i + 1, source.name);
                        println!("   Project: {}", source.project_id);
                        println!("   Dataset: {}", source.dataset_id);
                        println!("   CSV: {}", source.csv_path);
                    }
                }
                Err(e) => {
                    error!("Listing datasets failed: {e}");
                    println!("❌ Listing datasets failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Generate {
            csv_path,
            project_id,
            dataset_id,
            output_dir,
        } => {
            let project_id = project_id.unwrap_or_else(|| config.project_id.clone());
            let dataset_id = dataset_id.unwrap_or_else(|| config.dataset_id.clone());
            let aliases = config.alias_table()?;

            match integrator::generate_artifacts(
                &csv_path,
                &project_id,
                &dataset_id,
                output_dir.as_deref(),
                &aliases,
            ) {
                Ok(artifacts) => {
                    print_analysis_report(&artifacts.profile, artifacts.row_count);
                    if artifacts.written.is_empty() {
                        println!("\nGenerated Staging SQL:");
                        println!("{}", "=".repeat(60));
                        println!("{}", artifacts.model.sql);
                        println!("\nGenerated Config:");
                        println!("{}", "=".repeat(60));
                        match serde_yaml::to_string(&artifacts.fragment) {
                            Ok(yaml) => println!("{yaml}"),
                            Err(e) => println!("❌ Could not render config: {e}"),
                        }
                    } else {
                        for path in &artifacts.written {
                            println!("✓ Generated: {}", path.display());
                        }
                    }
                }
                Err(e) => {
                    error!("Generation failed: {e}");
                    println!("❌ Generation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::CleanHeader { src, dst } => match sanitize::clean_header(&src, &dst) {
            Ok(cleaned) => {
                println!("Old header: {:?}", cleaned.old);
                println!("New header: {:?}", cleaned.new);
                println!("✓ Wrote cleaned CSV ({} rows) to: {}", cleaned.rows, dst.display());
            }
            Err(e) => {
                error!("Header cleanup failed: {e}");
                println!("❌ Header cleanup failed: {e}");
                std::process::exit(1);
            }
        },
    }
    Ok(())
}

fn print_analysis_report(profile: &DatasetProfile, row_count: usize) {
    println!("\n{}", "=".repeat(60));
    println!("Dataset Analysis Report");
    println!("{}", "=".repeat(60));
    if let Some(name) = profile.csv_path.file_name() {
        println!("File: {}", name.to_string_lossy());
    }
    println!("Type: {}", profile.kind);
    println!("Rows: {row_count}");
    println!("Columns: {}", profile.columns.len());
    println!("\nDetected Mappings ({}):", profile.mapping.len());
    println!("{}", "-".repeat(60));
    for column in profile.mapping.iter() {
        println!("  {:20} <- {}", column.canonical, column.raw);
    }
    println!("{}\n", "=".repeat(60));
}

fn print_integration_summary(report: &IntegrationReport, config: &PipelineConfig) {
    if let Some(backup) = &report.backup_path {
        println!("✓ Created backup: {}", backup.display());
    }
    if report.registry_outcome.is_added() {
        println!("✓ Updated {}", config.raw_sources_file().display());
    } else {
        println!(
            "⚠ Source '{}' already exists in config, skipping...",
            report.names.source_name
        );
    }
    println!("✓ Created staging model: {}", report.staging_path.display());
    println!("✓ Updated {}", config.dbt_sources_file().display());

    println!("\n{}", "=".repeat(70));
    println!("✓ Dataset integrated successfully!");
    println!("{}", "=".repeat(70));
    println!("\nNext steps:");
    if let Some(name) = report.profile.csv_path.file_name() {
        println!(
            "1. Copy {} to {}",
            name.to_string_lossy(),
            config.data_dir().join(name).display()
        );
    }
    println!("2. Trigger the DAG in the Airflow UI");
    println!("3. Check staging model: {}", report.names.model_name);
}
