//! Error types for the tabreg pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    /// A caller named columns that the table does not have. Names are sorted.
    #[error("Missing required columns for {context}: {columns:?}")]
    MissingColumns { context: String, columns: Vec<String> },

    #[error("Zero variance in column '{column}', cannot scale")]
    ZeroVariance { column: String },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unable to connect: {0}")]
    ConnectionError(String),

    #[error("Unknown connection key: {0}")]
    UnknownConnection(String),

    #[error("Query failed: {0}")]
    QueryError(String),
}

impl PipelineError {
    /// Build a [`PipelineError::MissingColumns`] with the names sorted and deduplicated.
    pub fn missing_columns<I, S>(context: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        columns.sort();
        columns.dedup();
        PipelineError::MissingColumns {
            context: context.into(),
            columns,
        }
    }

    /// Errors raised by the data-access collaborators (connection setup and query execution).
    /// These are fatal for a run and are handled only at the outermost boundary.
    pub fn is_collaborator(&self) -> bool {
        matches!(
            self,
            PipelineError::ConnectionError(_)
                | PipelineError::UnknownConnection(_)
                | PipelineError::QueryError(_)
        )
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
