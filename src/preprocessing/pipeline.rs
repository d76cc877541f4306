//! Encoding pipeline: fit on training data, apply unchanged to validation and test

use crate::error::{PipelineError, Result};
use super::{
    config::EncoderConfig,
    constant_columns, drop_if_present,
    encoder::OneHotEncoder,
    require_columns,
    scaler::StandardScaler,
    schema::EncodingSchema,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Builds a [`FittedEncoder`] from a training partition
#[derive(Debug, Clone)]
pub struct TabularEncoder {
    config: EncoderConfig,
}

impl TabularEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Fit on the training partition and return the encoded training frame alongside
    /// the fitted state.
    pub fn fit(&self, train: &DataFrame) -> Result<(FittedEncoder, DataFrame)> {
        let start = Instant::now();
        let config = &self.config;

        let train = match &config.id_column {
            Some(id) => drop_if_present(train, id)?,
            None => train.clone(),
        };

        // Named feature columns must exist; the identifier drop above stays lenient.
        let named: Vec<String> = config
            .categorical_columns
            .iter()
            .chain(config.scale_columns.iter())
            .cloned()
            .collect();
        require_columns(&train, &named, "encoding")?;

        let one_hot = OneHotEncoder::new(config.categorical_columns.clone())
            .with_reference_levels(config.reference_levels.clone());
        let encoded = one_hot.encode(&train)?;
        let encoded_columns = EncodingSchema::from_frame(&encoded);

        let dropped_constant = constant_columns(&encoded)?;
        if let Some(column) = config
            .scale_columns
            .iter()
            .find(|c| dropped_constant.contains(c))
        {
            return Err(PipelineError::ZeroVariance {
                column: column.clone(),
            });
        }
        let pruned = drop_columns(&encoded, &dropped_constant)?;

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&pruned, &config.scale_columns)?;
        let schema = EncodingSchema::from_frame(&scaled);

        debug!(
            columns = schema.len(),
            dropped_constant = dropped_constant.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Encoder fitted"
        );

        let fitted = FittedEncoder {
            config: config.clone(),
            one_hot,
            encoded_columns,
            dropped_constant,
            scaler,
            schema,
        };
        Ok((fitted, scaled))
    }
}

/// Encoder state learned from the training partition.
///
/// Holds everything needed to encode another partition identically: the
/// pre-pruning column order used for alignment, the constant columns, the scaler
/// and the final [`EncodingSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedEncoder {
    config: EncoderConfig,
    one_hot: OneHotEncoder,
    encoded_columns: EncodingSchema,
    dropped_constant: Vec<String>,
    scaler: StandardScaler,
    schema: EncodingSchema,
}

impl FittedEncoder {
    /// Encode a validation or test partition with the training state.
    ///
    /// The output always has exactly the columns of [`FittedEncoder::schema`].
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let df = match &self.config.id_column {
            Some(id) => drop_if_present(df, id)?,
            None => df.clone(),
        };

        let encoded = self.one_hot.encode(&df)?;
        let aligned = self.encoded_columns.align(&encoded)?;
        let pruned = drop_columns(&aligned, &self.dropped_constant)?;
        let scaled = self.scaler.transform(&pruned)?;

        self.schema.ensure_matches(&scaled)?;
        Ok(scaled)
    }

    /// Final training column order
    pub fn schema(&self) -> &EncodingSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Training columns removed for having zero variance
    pub fn dropped_constant_columns(&self) -> &[String] {
        &self.dropped_constant
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Save the fitted encoder as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted encoder from JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let encoder: Self = serde_json::from_str(&json)?;
        Ok(encoder)
    }
}

/// Encoded partitions produced by [`encode_partitions`]
#[derive(Debug, Clone)]
pub struct EncodedPartitions {
    pub train: DataFrame,
    pub validation: DataFrame,
    pub test: Option<DataFrame>,
    pub encoder: FittedEncoder,
}

impl EncodedPartitions {
    pub fn scaler(&self) -> &StandardScaler {
        self.encoder.scaler()
    }

    pub fn dropped_constant_columns(&self) -> &[String] {
        self.encoder.dropped_constant_columns()
    }

    pub fn schema(&self) -> &EncodingSchema {
        self.encoder.schema()
    }
}

/// Fit the encoder on `train` and apply it to `validation` and the optional `test`.
pub fn encode_partitions(
    config: &EncoderConfig,
    train: &DataFrame,
    validation: &DataFrame,
    test: Option<&DataFrame>,
) -> Result<EncodedPartitions> {
    let (encoder, train) = TabularEncoder::new(config.clone()).fit(train)?;
    let validation = encoder.transform(validation)?;
    let test = test.map(|t| encoder.transform(t)).transpose()?;

    Ok(EncodedPartitions {
        train,
        validation,
        test,
        encoder,
    })
}

fn drop_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    if columns.is_empty() {
        return Ok(df.clone());
    }
    Ok(df.drop_many(columns.iter().map(String::as_str)))
}
