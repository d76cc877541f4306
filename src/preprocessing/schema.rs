//! Encoding schema: the ordered training column set every partition is aligned to

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{column_names, column_to_f64, frame_from_columns};

/// Ordered output columns produced while encoding the training partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingSchema {
    columns: Vec<String>,
}

impl EncodingSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Capture the columns of an encoded frame
    pub fn from_frame(df: &DataFrame) -> Self {
        Self::new(column_names(df))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reindex `df` to exactly these columns in this order.
    ///
    /// Schema columns absent from `df` are filled with zero; extra columns are dropped.
    pub fn align(&self, df: &DataFrame) -> Result<DataFrame> {
        let height = df.height();
        let columns = self
            .columns
            .iter()
            .map(|name| {
                let values = if df.column(name).is_ok() {
                    column_to_f64(df, name)?
                } else {
                    vec![0.0; height]
                };
                Ok((name.clone(), values))
            })
            .collect::<Result<Vec<_>>>()?;

        frame_from_columns(columns)
    }

    /// Check that `df` has exactly these columns in this order
    pub fn ensure_matches(&self, df: &DataFrame) -> Result<()> {
        let actual = column_names(df);
        if actual == self.columns {
            return Ok(());
        }

        let expected: HashSet<&str> = self.columns.iter().map(String::as_str).collect();
        let present: HashSet<&str> = actual.iter().map(String::as_str).collect();
        let mut missing: Vec<&str> = expected.difference(&present).copied().collect();
        let mut extra: Vec<&str> = present.difference(&expected).copied().collect();
        missing.sort_unstable();
        extra.sort_unstable();

        if missing.is_empty() && extra.is_empty() {
            return Err(PipelineError::SchemaMismatch(
                "columns are out of order".to_string(),
            ));
        }

        Err(PipelineError::SchemaMismatch(format!(
            "missing {:?}, unexpected {:?}",
            missing, extra
        )))
    }
}
