//! Encoder configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for encoding a raw table into a numeric matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Columns to one-hot encode with a dropped reference level
    pub categorical_columns: Vec<String>,

    /// Numeric columns to standardize with training statistics
    pub scale_columns: Vec<String>,

    /// Identifier column removed from every partition (absence is not an error)
    pub id_column: Option<String>,

    /// Pinned reference level per categorical column.
    /// Columns without an entry drop their first level in sort order.
    #[serde(default)]
    pub reference_levels: BTreeMap<String, String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            categorical_columns: Vec::new(),
            scale_columns: Vec::new(),
            id_column: Some("id".to_string()),
            reference_levels: BTreeMap::new(),
        }
    }
}

impl EncoderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the categorical columns
    pub fn with_categorical<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the numeric columns to scale
    pub fn with_scaled<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scale_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set (or clear) the identifier column
    pub fn with_id_column(mut self, id_column: Option<&str>) -> Self {
        self.id_column = id_column.map(str::to_string);
        self
    }

    /// Builder method to pin the reference level dropped for a categorical column
    pub fn with_reference_level(mut self, column: &str, level: &str) -> Self {
        self.reference_levels
            .insert(column.to_string(), level.to_string());
        self
    }
}
