//! Run configuration and project directory layout

use crate::error::{PipelineError, Result};
use crate::preprocessing::EncoderConfig;
use crate::telemetry::LoggingConfig;
use crate::training::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Full configuration of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub target_column: String,
    pub id_column: String,

    /// Tag prefixed to output file names
    pub version: String,

    pub categorical_columns: Vec<String>,
    pub scale_columns: Vec<String>,

    /// Pinned reference level per categorical column
    pub reference_levels: BTreeMap<String, String>,

    pub validation_split: f64,
    pub random_state: u64,

    pub logging: LoggingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut reference_levels = BTreeMap::new();
        reference_levels.insert("study_method".to_string(), "single".to_string());

        Self {
            target_column: "exam_score".to_string(),
            id_column: "id".to_string(),
            version: "v03".to_string(),
            categorical_columns: [
                "gender",
                "course",
                "internet_access",
                "study_method",
                "sleep_quality",
                "facility_rating",
                "exam_difficulty",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            scale_columns: ["age", "study_hours", "class_attendance", "sleep_hours"]
                .into_iter()
                .map(String::from)
                .collect(),
            reference_levels,
            validation_split: 0.2,
            random_state: 42,
            logging: LoggingConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target_column = target.to_string();
        self
    }

    pub fn with_categorical<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scaled<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scale_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_validation_split(mut self, split: f64) -> Self {
        self.validation_split = split;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.validation_split > 0.0 && self.validation_split < 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "validation_split must be in (0, 1), got {}",
                self.validation_split
            )));
        }
        if self.categorical_columns.contains(&self.target_column)
            || self.scale_columns.contains(&self.target_column)
        {
            return Err(PipelineError::ConfigError(format!(
                "target column '{}' cannot also be a feature",
                self.target_column
            )));
        }
        Ok(())
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        let mut config = EncoderConfig::new()
            .with_categorical(self.categorical_columns.iter().cloned())
            .with_scaled(self.scale_columns.iter().cloned())
            .with_id_column(Some(&self.id_column));
        for (column, level) in &self.reference_levels {
            config = config.with_reference_level(column, level);
        }
        config
    }

    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig::new(&self.target_column)
            .with_id_column(&self.id_column)
            .with_validation_split(self.validation_split)
            .with_random_state(self.random_state)
    }

    /// File name of the prediction output
    pub fn submission_file_name(&self) -> String {
        format!("{}-submission.csv", self.version)
    }
}

/// Directory layout of a project rooted at one directory
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub raw_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub sql_dir: PathBuf,
}

impl ProjectPaths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            raw_dir: root.join("data-raw"),
            data_dir: root.join("data"),
            log_file: root.join("logs").join("main.log"),
            sql_dir: root.join("sql").join("extracts"),
            root,
        }
    }

    /// Parent of the directory holding the running executable, or the current
    /// directory when that cannot be determined.
    pub fn discover() -> Self {
        let root = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent()?.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_root(root)
    }

    pub fn train_csv(&self) -> PathBuf {
        self.raw_dir.join("train.csv")
    }

    pub fn test_csv(&self) -> PathBuf {
        self.raw_dir.join("test.csv")
    }
}
