use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::adapter::AliasTable;
use crate::error::Result;

/// Optional settings file, read from the working directory when present.
const CONFIG_PATH: &str = "adapter.toml";

/// Pipeline-level settings: where the Airflow/dbt tree lives and which
/// warehouse coordinates newly registered datasets default to.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Root of the pipeline tree; `config/`, `dbt/` and `data/` live under it.
    #[serde(default = "default_home")]
    pub home: PathBuf,
    /// Default GCP project ID for new sources.
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Default BigQuery dataset ID for new sources.
    #[serde(default = "default_dataset_id")]
    pub dataset_id: String,
    /// Optional YAML file with a deployment-specific alias table; the
    /// built-in loan-dataset table is used when unset.
    #[serde(default)]
    pub aliases_file: Option<PathBuf>,
}

fn default_home() -> PathBuf {
    env::var("AIRFLOW_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/usr/local/airflow"))
}

fn default_project_id() -> String {
    "vivid-layout-453307-p4".to_string()
}

fn default_dataset_id() -> String {
    "ryoji_raw_demo".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            project_id: default_project_id(),
            dataset_id: default_dataset_id(),
            aliases_file: None,
        }
    }
}

impl PipelineConfig {
    /// Load settings from `adapter.toml` when it exists, defaults otherwise.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Settings rooted at an explicit pipeline home, defaults elsewhere.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            ..Self::default()
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.join("config")
    }

    pub fn dbt_dir(&self) -> PathBuf {
        self.home.join("dbt")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.dbt_dir().join("models").join("staging")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.home.join("data")
    }

    pub fn raw_sources_file(&self) -> PathBuf {
        self.config_dir().join("raw_sources.yml")
    }

    pub fn dbt_sources_file(&self) -> PathBuf {
        self.staging_dir().join("sources.yml")
    }

    /// The alias table this pipeline maps columns with: the file named by
    /// `aliases_file` when set, the built-in table otherwise.
    pub fn alias_table(&self) -> Result<AliasTable> {
        match &self.aliases_file {
            Some(path) => AliasTable::load(path),
            None => Ok(AliasTable::builtin()),
        }
    }

    /// Resolve a CSV path the way the loader does: absolute paths pass
    /// through, relative paths are anchored at the pipeline home.
    pub fn resolve_csv_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.home.join(path)
        }
    }
}
