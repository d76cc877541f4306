//! Training engine: frames in, fitted OLS model and predictions out

use crate::error::{PipelineError, Result};
use super::diagnostics::condition_number;
use super::linear_models::LinearRegression;
use super::metrics::RegressionMetrics;
use super::TrainingConfig;
use crate::preprocessing::column_to_f64;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Fits an OLS model on an encoded feature frame and remembers the feature order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTrainer {
    config: TrainingConfig,
    feature_names: Vec<String>,
    model: LinearRegression,
    condition_number: Option<f64>,
    is_fitted: bool,
}

impl RegressionTrainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig) -> Self {
        let model = LinearRegression::new().with_fit_intercept(config.fit_intercept);
        Self {
            config,
            feature_names: Vec::new(),
            model,
            condition_number: None,
            is_fitted: false,
        }
    }

    /// Fit on every column of `features` against `target`.
    ///
    /// The condition number of the design matrix is recorded and logged; the fit
    /// proceeds whatever its value.
    pub fn fit(&mut self, features: &DataFrame, target: &Array1<f64>) -> Result<&mut Self> {
        let start = Instant::now();
        let feature_names = crate::preprocessing::column_names(features);
        let x = frame_to_array2(features, &feature_names)?;

        let cond = condition_number(&x);
        info!("cond: {}", cond);

        self.model.fit(&x, target)?;
        self.feature_names = feature_names;
        self.condition_number = Some(cond);
        self.is_fitted = true;

        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Model fitted"
        );
        Ok(self)
    }

    /// Predict for a frame, selecting columns in the training feature order
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }
        let x = frame_to_array2(df, &self.feature_names)?;
        self.model.predict(&x)
    }

    /// Predict on `df` and score against `target`
    pub fn evaluate(&self, df: &DataFrame, target: &Array1<f64>) -> Result<RegressionMetrics> {
        let predictions = self.predict(df)?;
        if predictions.len() != target.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("target length = {}", predictions.len()),
                actual: format!("target length = {}", target.len()),
            });
        }
        Ok(RegressionMetrics::compute(target, &predictions))
    }

    /// Output table of `(id_column, target_column)` pairs
    pub fn submission(&self, ids: &Column, predictions: &Array1<f64>) -> Result<DataFrame> {
        if ids.len() != predictions.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} ids", predictions.len()),
                actual: format!("{} ids", ids.len()),
            });
        }

        let id = ids
            .as_materialized_series()
            .clone()
            .with_name(self.config.id_column.as_str().into());
        let prediction = Series::new(
            self.config.target_column.as_str().into(),
            predictions.to_vec(),
        );
        Ok(DataFrame::new(vec![id.into(), prediction.into()])?)
    }

    /// Training feature order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Condition number of the training design matrix
    pub fn condition_number(&self) -> Option<f64> {
        self.condition_number
    }

    pub fn model(&self) -> &LinearRegression {
        &self.model
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

/// Extract named columns into a row-major `Array2<f64>`.
/// A missing column is a [`PipelineError::FeatureNotFound`].
pub fn frame_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| column_to_f64(df, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((n_rows, col_names.len()), |(r, c)| col_data[c][r]))
}

/// Extract a single column as an `Array1<f64>`
pub fn column_to_array1(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    Ok(Array1::from(column_to_f64(df, name)?))
}
