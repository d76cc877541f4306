//! Training configuration

use serde::{Deserialize, Serialize};

/// Configuration for fitting and evaluating the regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Target column name
    pub target_column: String,

    /// Identifier column carried into the prediction output
    pub id_column: String,

    /// Fraction of the training rows held out for validation
    pub validation_split: f64,

    /// Random seed for the train/validation shuffle
    pub random_state: u64,

    /// Whether to fit an intercept
    pub fit_intercept: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: "exam_score".to_string(),
            id_column: "id".to_string(),
            validation_split: 0.2,
            random_state: 42,
            fit_intercept: true,
        }
    }
}

impl TrainingConfig {
    /// Create a new training configuration for a target
    pub fn new(target_column: &str) -> Self {
        Self {
            target_column: target_column.to_string(),
            ..Default::default()
        }
    }

    /// Builder method to set the identifier column
    pub fn with_id_column(mut self, id_column: &str) -> Self {
        self.id_column = id_column.to_string();
        self
    }

    /// Builder method to set the validation split
    pub fn with_validation_split(mut self, split: f64) -> Self {
        self.validation_split = split;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }
}
