//! Model training module
//!
//! Ordinary least squares on the encoded, augmented feature matrix:
//! - Normal-equation OLS solver
//! - Regression metrics (MSE, RMSE, MAE, R²)
//! - Design-matrix condition number
//! - A trainer that keeps the training feature order for prediction

mod config;
mod engine;
pub mod diagnostics;
pub mod linear_models;
pub mod metrics;

pub use config::TrainingConfig;
pub use diagnostics::condition_number;
pub use engine::{column_to_array1, frame_to_array2, RegressionTrainer};
pub use linear_models::LinearRegression;
pub use metrics::{r2_score, RegressionMetrics};
