//! End-to-end run: split, encode, augment, fit, evaluate, predict

use crate::config::{PipelineConfig, ProjectPaths};
use crate::data::{train_validation_split, DataLoader, DataSaver};
use crate::error::{PipelineError, Result};
use crate::feature_engineering::{FeatureAugmenter, FeatureTransformer};
use crate::preprocessing::{column_names, encode_partitions, FittedEncoder};
use crate::training::{RegressionMetrics, RegressionTrainer};
use polars::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, info_span};

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub metrics: RegressionMetrics,
    pub condition_number: f64,
    pub dropped_constant_columns: Vec<String>,
    pub feature_columns: Vec<String>,
    pub train_shape: (usize, usize),
    pub validation_shape: (usize, usize),
    pub test_shape: (usize, usize),
    pub encoder: FittedEncoder,
    pub trainer: RegressionTrainer,
    /// `(id_column, target_column)` prediction table, one row per test record
    pub submission: DataFrame,
}

/// Tabular regression pipeline
pub struct Pipeline {
    config: PipelineConfig,
    augmenter: FeatureAugmenter,
}

impl Pipeline {
    /// Create a pipeline with the exam-score feature terms
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            augmenter: FeatureAugmenter::exam_score(),
        }
    }

    /// Replace the feature augmenter
    pub fn with_augmenter(mut self, augmenter: FeatureAugmenter) -> Self {
        self.augmenter = augmenter;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run on in-memory training (with target) and test (without target) tables
    pub fn run(&self, train_df: &DataFrame, test_df: &DataFrame) -> Result<PipelineReport> {
        let _span = info_span!("pipeline", version = %self.config.version).entered();
        self.config.validate()?;

        info!("===Feature Engineering===");
        let split = train_validation_split(
            train_df,
            &self.config.target_column,
            self.config.validation_split,
            self.config.random_state,
        )?;

        let encoded = {
            let _span = info_span!("encode").entered();
            encode_partitions(
                &self.config.encoder_config(),
                &split.x_train,
                &split.x_val,
                Some(test_df),
            )?
        };
        let test_encoded = encoded.test.as_ref().ok_or_else(|| {
            PipelineError::ComputationError("test partition was not encoded".to_string())
        })?;

        let (x_train, x_val, x_test) = {
            let _span = info_span!("augment").entered();
            (
                self.augmenter.transform(&encoded.train)?,
                self.augmenter.transform(&encoded.validation)?,
                self.augmenter.transform(test_encoded)?,
            )
        };
        let feature_columns = column_names(&x_train);

        let mut trainer = RegressionTrainer::new(self.config.training_config());
        let _train_span = info_span!("train").entered();
        trainer.fit(&x_train, &split.y_train)?;

        let dropped = encoded.dropped_constant_columns().to_vec();
        info!("dropped constant cols: {}", dropped.len());
        info!("Encoded datasets built successfully!");
        info!("X_train_enc: {:?} | X_val_enc: {:?}", x_train.shape(), x_val.shape());
        info!("y_train: ({},) | y_val: ({},)", split.y_train.len(), split.y_val.len());
        info!("X_test_enc: {:?}", x_test.shape());

        info!("===Modeling + Submission===");
        let metrics = trainer.evaluate(&x_val, &split.y_val)?;
        info!("MSE : {:.4}", metrics.mse);
        info!("RMSE: {:.4}", metrics.rmse);
        info!("MAE : {:.4}", metrics.mae);
        info!("R^2 : {:.4}", metrics.r2);

        let test_pred = trainer.predict(&x_test)?;
        let ids = test_df
            .column(&self.config.id_column)
            .map_err(|_| PipelineError::FeatureNotFound(self.config.id_column.clone()))?;
        let submission = trainer.submission(ids, &test_pred)?;

        Ok(PipelineReport {
            metrics,
            condition_number: trainer.condition_number().unwrap_or(f64::NAN),
            dropped_constant_columns: dropped,
            feature_columns,
            train_shape: x_train.shape(),
            validation_shape: x_val.shape(),
            test_shape: x_test.shape(),
            encoder: encoded.encoder.clone(),
            trainer,
            submission,
        })
    }

    /// Load `data-raw/{train,test}.csv`, run, and write the submission under `data/`
    pub fn run_from_paths(&self, paths: &ProjectPaths) -> Result<(PipelineReport, PathBuf)> {
        let loader = DataLoader::new();
        let train_df = loader.load_csv(paths.train_csv())?;
        let test_df = loader.load_csv(paths.test_csv())?;
        info!("Datasets loaded!");

        let mut report = self.run(&train_df, &test_df)?;

        let submission_path = paths.data_dir.join(self.config.submission_file_name());
        DataSaver::save_csv(&mut report.submission, &submission_path)?;
        info!("Saved: {}", submission_path.display());

        debug!("Project complete.");
        Ok((report, submission_path))
    }
}
