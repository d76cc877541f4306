//! One-hot encoding with a dropped reference level

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{column_names, column_to_f64, frame_from_columns};

/// Reference-level-dropped one-hot encoder.
///
/// Each partition is encoded on its own: the levels are whatever that partition
/// contains, so a column with `k` observed levels yields `k - 1` indicators named
/// `{column}_{level}`. Reconciling partitions is the job of
/// [`EncodingSchema::align`](super::EncodingSchema::align).
///
/// Levels are ordered by value in the column's own dtype: numerically for numeric
/// columns (`1 < 2 < 10`), lexicographically for strings. The first level in that
/// order is the default reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    reference_levels: BTreeMap<String, String>,
}

impl OneHotEncoder {
    /// Create an encoder for the given categorical columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            reference_levels: BTreeMap::new(),
        }
    }

    /// Pin the reference level for a column
    pub fn with_reference_level(mut self, column: &str, level: &str) -> Self {
        self.reference_levels
            .insert(column.to_string(), level.to_string());
        self
    }

    /// Replace all pinned reference levels
    pub fn with_reference_levels(mut self, levels: BTreeMap<String, String>) -> Self {
        self.reference_levels = levels;
        self
    }

    /// Categorical columns this encoder expands
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Level dropped for `column` given the levels observed in one partition.
    /// A pinned level only applies when the partition actually contains it.
    pub fn reference_level<'a>(&self, column: &str, levels: &'a [String]) -> Option<&'a String> {
        self.reference_levels
            .get(column)
            .and_then(|pinned| levels.iter().find(|level| *level == pinned))
            .or_else(|| levels.first())
    }

    /// Encode one partition.
    ///
    /// Non-categorical columns pass through first, in their original order and cast
    /// to `Float64`; indicator blocks follow in the order the categorical columns
    /// were listed, with levels sorted inside each block.
    pub fn encode(&self, df: &DataFrame) -> Result<DataFrame> {
        let missing: Vec<&String> = self
            .columns
            .iter()
            .filter(|c| df.column(c.as_str()).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::missing_columns(
                "one-hot encoding",
                missing.into_iter().cloned(),
            ));
        }

        let categorical: HashSet<&str> = self.columns.iter().map(String::as_str).collect();
        let mut output: Vec<(String, Vec<f64>)> = Vec::new();

        for name in column_names(df) {
            if !categorical.contains(name.as_str()) {
                let values = column_to_f64(df, &name)?;
                output.push((name, values));
            }
        }

        for col_name in &self.columns {
            output.extend(self.indicators(df, col_name)?);
        }

        frame_from_columns(output)
    }

    fn indicators(&self, df: &DataFrame, col_name: &str) -> Result<Vec<(String, Vec<f64>)>> {
        let original = df
            .column(col_name)
            .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?
            .as_materialized_series();
        let series = original.cast(&DataType::String)?;
        let values: Vec<Option<String>> = series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();

        let levels = observed_levels(original, &values)?;
        let reference = self.reference_level(col_name, &levels).cloned();

        let columns = levels
            .iter()
            .filter(|level| Some(*level) != reference.as_ref())
            .map(|level| {
                let indicator: Vec<f64> = values
                    .iter()
                    .map(|v| if v.as_deref() == Some(level.as_str()) { 1.0 } else { 0.0 })
                    .collect();
                (format!("{}_{}", col_name, level), indicator)
            })
            .collect();

        Ok(columns)
    }
}

/// Distinct non-null levels of a column, in the order of its original dtype
fn observed_levels(original: &Series, labels: &[Option<String>]) -> Result<Vec<String>> {
    let mut levels: Vec<String> = labels
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let dtype = original.dtype();
    if !(dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean)) {
        return Ok(levels);
    }

    let keys = original.cast(&DataType::Float64)?;
    let key_of: HashMap<&str, f64> = labels
        .iter()
        .zip(keys.f64()?.into_iter())
        .filter_map(|(label, key)| Some((label.as_deref()?, key?)))
        .collect();
    levels.sort_by(|a, b| {
        let ka = key_of.get(a.as_str()).copied().unwrap_or(f64::NAN);
        let kb = key_of.get(b.as_str()).copied().unwrap_or(f64::NAN);
        ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
    });
    Ok(levels)
}
