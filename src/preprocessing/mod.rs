//! Data preprocessing module
//!
//! Turns a raw table of mixed categorical and numeric columns into an all-`Float64`
//! matrix that a linear model can consume, consistently across partitions:
//! - Identifier removal
//! - One-hot encoding with a dropped reference level
//! - Column alignment against the training [`EncodingSchema`]
//! - Constant-column pruning
//! - Standard scaling with training statistics

mod config;
mod encoder;
mod pipeline;
mod scaler;
mod schema;

pub use config::EncoderConfig;
pub use encoder::OneHotEncoder;
pub use pipeline::{encode_partitions, EncodedPartitions, FittedEncoder, TabularEncoder};
pub use scaler::{ColumnScale, StandardScaler};
pub use schema::EncodingSchema;

use crate::error::{PipelineError, Result};
use polars::prelude::*;

/// Column names of a frame, in order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Extract a column as `f64` values. Nulls become `NaN`.
pub fn column_to_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series();

    if matches!(series.dtype(), DataType::String) {
        return Err(PipelineError::PreprocessingError(format!(
            "column '{}' holds strings and is not listed as categorical",
            name
        )));
    }

    let casted = series.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Build a frame from named `f64` columns
pub(crate) fn frame_from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<DataFrame> {
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Series::new(name.into(), values).into())
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Drop a column if present, returning the frame unchanged otherwise
pub(crate) fn drop_if_present(df: &DataFrame, name: &str) -> Result<DataFrame> {
    if df.column(name).is_ok() {
        Ok(df.drop(name)?)
    } else {
        Ok(df.clone())
    }
}

/// Mean of the non-NaN values
pub(crate) fn nan_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Standard deviation of the non-NaN values with `ddof` delta degrees of freedom.
/// `None` when fewer than `ddof + 1` values are available.
pub(crate) fn nan_std(values: &[f64], ddof: usize) -> Option<f64> {
    let mean = nan_mean(values)?;
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.len() <= ddof {
        return None;
    }
    let ss: f64 = present.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((ss / (present.len() - ddof) as f64).sqrt())
}

/// True when at least `min_count` non-NaN values are present and all of them are equal.
///
/// Compares values directly: a repeated `0.1` has a computed deviation of about
/// `1e-17`, not zero.
pub(crate) fn is_constant(values: &[f64], min_count: usize) -> bool {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    present.len() >= min_count && present.windows(2).all(|w| w[0] == w[1])
}

/// Columns with zero sample standard deviation, i.e. every present value equal.
/// A column with fewer than two present values has no defined deviation and is kept.
pub fn constant_columns(df: &DataFrame) -> Result<Vec<String>> {
    let mut constant = Vec::new();
    for name in column_names(df) {
        let values = column_to_f64(df, &name)?;
        if is_constant(&values, 2) {
            constant.push(name);
        }
    }
    Ok(constant)
}

/// Fail with [`PipelineError::MissingColumns`] if any of `required` is absent from `df`
pub(crate) fn require_columns<'a, I>(df: &DataFrame, required: I, context: &str) -> Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let missing: Vec<&String> = required
        .into_iter()
        .filter(|name| df.column(name.as_str()).is_err())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::missing_columns(
            context,
            missing.into_iter().cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_std() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sample = nan_std(&values, 1).unwrap();
        let population = nan_std(&values, 0).unwrap();
        assert!((sample - 2.5f64.sqrt()).abs() < 1e-12);
        assert!((population - 2.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(nan_std(&[3.0], 1), None);
        assert_eq!(nan_std(&[f64::NAN, 2.0, 4.0], 0), Some(1.0));
    }

    #[test]
    fn test_constant_columns() {
        let df = df!(
            "a" => &[1.0, 1.0, 1.0],
            "b" => &[1.0, 2.0, 3.0],
            "c" => &[0i32, 0, 0],
        )
        .unwrap();
        assert_eq!(constant_columns(&df).unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn test_constant_columns_inexact_value() {
        let df = df!(
            "campus" => &[0.1, 0.1, 0.1],
            "rate" => &[0.1, 0.2, 0.1],
        )
        .unwrap();
        assert!(nan_std(&[0.1, 0.1, 0.1], 1).unwrap() > 0.0);
        assert_eq!(constant_columns(&df).unwrap(), vec!["campus"]);
    }

    #[test]
    fn test_is_constant_ignores_nan() {
        assert!(is_constant(&[f64::NAN, 0.3, 0.3], 2));
        assert!(!is_constant(&[f64::NAN, 0.3, f64::NAN], 2));
        assert!(is_constant(&[0.3], 1));
        assert!(!is_constant(&[0.3, 0.30000000000000004], 1));
    }

    #[test]
    fn test_single_row_has_no_constant_columns() {
        let df = df!("a" => &[1.0]).unwrap();
        assert!(constant_columns(&df).unwrap().is_empty());
    }

    #[test]
    fn test_string_column_rejected() {
        let df = df!("name" => &["x", "y"]).unwrap();
        let err = column_to_f64(&df, "name").unwrap_err();
        assert!(matches!(err, PipelineError::PreprocessingError(_)));
    }
}
