//! tabreg - tabular regression pipeline
//!
//! Turns a mixed categorical/numeric training table into a numeric design
//! matrix, appends interaction terms, fits ordinary least squares, reports
//! validation error and writes predictions for a test table.
//!
//! # Modules
//!
//! - [`preprocessing`] - One-hot encoding, alignment, constant pruning, scaling
//! - [`feature_engineering`] - Interaction and curvature terms
//! - [`training`] - OLS, metrics and conditioning diagnostics
//! - [`data`] - CSV I/O, train/validation split, SQL extraction
//! - [`pipeline`] - The end-to-end run
//! - [`cli`] - Command-line interface

pub mod error;

pub mod preprocessing;
pub mod feature_engineering;
pub mod training;

pub mod data;
pub mod config;
pub mod pipeline;
pub mod telemetry;
pub mod utils;

pub mod cli;

pub use error::{PipelineError, Result};

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::{PipelineConfig, ProjectPaths};
    pub use crate::data::{train_validation_split, DataLoader, DataSaver, ExtractionConfig};
    pub use crate::error::{PipelineError, Result};
    pub use crate::feature_engineering::{FeatureAugmenter, FeatureTransformer};
    pub use crate::pipeline::{Pipeline, PipelineReport};
    pub use crate::preprocessing::{
        encode_partitions, EncoderConfig, EncodingSchema, FittedEncoder, OneHotEncoder,
        StandardScaler, TabularEncoder,
    };
    pub use crate::training::{condition_number, LinearRegression, RegressionMetrics, RegressionTrainer};
}
