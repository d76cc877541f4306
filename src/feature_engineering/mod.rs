//! Feature engineering module
//!
//! Derived columns for linear models:
//! - Pairwise interaction terms (products)
//! - Curvature terms (squares)

pub mod interactions;

pub use interactions::{CurvatureTerm, FeatureAugmenter, InteractionTerm, InteractionType};

use crate::error::Result;
use polars::prelude::DataFrame;

/// Trait for frame-level feature transformers.
///
/// Implementations must not mutate their input and must be deterministic, so the
/// same transformer applied to train, validation and test keeps them aligned.
pub trait FeatureTransformer: Send + Sync {
    /// Return a copy of `df` with the derived columns appended
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;

    /// Names of the derived columns, in output order
    fn get_feature_names(&self) -> Vec<String>;
}
