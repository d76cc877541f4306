//! Standard scaling fitted on training data

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::{column_to_f64, is_constant, nan_mean, nan_std, require_columns};

/// Fitted statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std: f64,
}

/// Z-score scaler: `(x - mean) / std`, statistics from the training partition only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ColumnScale>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new, unfitted scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the named columns.
    ///
    /// Every column must exist; a column whose present values are all equal (or absent)
    /// cannot be scaled.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        require_columns(df, columns, "scaling")?;

        let mut params = Vec::with_capacity(columns.len());
        for col_name in columns {
            let values = column_to_f64(df, col_name)?;
            let mean = nan_mean(&values).unwrap_or(0.0);
            let std = nan_std(&values, 0).unwrap_or(0.0);
            if std == 0.0 || is_constant(&values, 1) {
                return Err(PipelineError::ZeroVariance {
                    column: col_name.clone(),
                });
            }
            params.push(ColumnScale {
                column: col_name.clone(),
                mean,
                std,
            });
        }

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data, replacing each fitted column in place
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.apply(df, |v, p| (v - p.mean) / p.std)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fitted statistics, in fit order
    pub fn params(&self) -> &[ColumnScale] {
        &self.params
    }

    /// Statistics for one column
    pub fn get(&self, column: &str) -> Option<&ColumnScale> {
        self.params.iter().find(|p| p.column == column)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn apply(&self, df: &DataFrame, f: impl Fn(f64, &ColumnScale) -> f64) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for p in &self.params {
            let values = column_to_f64(df, &p.column)?;
            let scaled: Vec<f64> = values.into_iter().map(|v| f(v, p)).collect();
            result.with_column(Series::new(p.column.as_str().into(), scaled))?;
        }

        Ok(result)
    }
}
