//! Interaction and curvature features

use crate::error::{PipelineError, Result};
use crate::feature_engineering::FeatureTransformer;
use crate::preprocessing::column_to_f64;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Type of derived term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionType {
    /// Multiplication: x1 * x2
    Multiply,
    /// Square: x * x
    Square,
}

impl InteractionType {
    /// Apply interaction operation
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            InteractionType::Multiply => a * b,
            InteractionType::Square => a * a,
        }
    }
}

/// Product of two columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTerm {
    pub name: String,
    pub left: String,
    pub right: String,
}

/// Square of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvatureTerm {
    pub name: String,
    pub base: String,
}

/// Appends interaction and curvature columns after checking that every input exists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureAugmenter {
    required: BTreeSet<String>,
    interactions: Vec<InteractionTerm>,
    curvatures: Vec<CurvatureTerm>,
}

impl FeatureAugmenter {
    /// Create an augmenter with no terms
    pub fn new() -> Self {
        Self::default()
    }

    /// Terms for the study-habits exam-score dataset
    pub fn exam_score() -> Self {
        Self::new()
            .with_interaction("study_hours_attendance", "study_hours", "class_attendance")
            .with_interaction("study_sleep", "study_hours", "sleep_hours")
            .with_interaction("attendance_sleep", "class_attendance", "sleep_hours")
            .with_interaction(
                "study_hours_exam_difficulty__hard",
                "study_hours",
                "exam_difficulty_hard",
            )
            .with_interaction(
                "study_hours_exam_difficulty__moderate",
                "study_hours",
                "exam_difficulty_moderate",
            )
            .with_interaction(
                "study_hours_sleep_quality__good",
                "study_hours",
                "sleep_quality_good",
            )
            .with_interaction(
                "study_hours_sleep_quality__poor",
                "study_hours",
                "sleep_quality_poor",
            )
            .with_interaction(
                "study_method_mixed_facility_rating__low",
                "study_method_mixed",
                "facility_rating_low",
            )
            .with_interaction(
                "study_method_mixed_facility_rating__medium",
                "study_method_mixed",
                "facility_rating_medium",
            )
            .with_interaction(
                "study_method_mixed_exam_difficulty__hard",
                "study_method_mixed",
                "exam_difficulty_hard",
            )
            .with_interaction(
                "study_method_mixed_exam_difficulty__moderate",
                "study_method_mixed",
                "exam_difficulty_moderate",
            )
            .with_curvature("study_hours_curve", "study_hours")
            .with_curvature("sleep_hours_curve", "sleep_hours")
    }

    /// Add a product term; both operands become required
    pub fn with_interaction(mut self, name: &str, left: &str, right: &str) -> Self {
        self.required.insert(left.to_string());
        self.required.insert(right.to_string());
        self.interactions.push(InteractionTerm {
            name: name.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        });
        self
    }

    /// Add a square term; the base becomes required
    pub fn with_curvature(mut self, name: &str, base: &str) -> Self {
        self.required.insert(base.to_string());
        self.curvatures.push(CurvatureTerm {
            name: name.to_string(),
            base: base.to_string(),
        });
        self
    }

    /// Require a column without deriving anything from it
    pub fn with_required(mut self, column: &str) -> Self {
        self.required.insert(column.to_string());
        self
    }

    /// Required input columns, sorted
    pub fn required_columns(&self) -> Vec<String> {
        self.required.iter().cloned().collect()
    }

    pub fn interactions(&self) -> &[InteractionTerm] {
        &self.interactions
    }

    pub fn curvatures(&self) -> &[CurvatureTerm] {
        &self.curvatures
    }

    fn check_required(&self, df: &DataFrame) -> Result<()> {
        let missing: Vec<&String> = self
            .required
            .iter()
            .filter(|name| df.column(name.as_str()).is_err())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::missing_columns(
                "linear features",
                missing.into_iter().cloned(),
            ))
        }
    }

    fn derive(
        df: &DataFrame,
        a: &str,
        b: &str,
        interaction: InteractionType,
    ) -> Result<Vec<f64>> {
        let left = column_to_f64(df, a)?;
        let right = column_to_f64(df, b)?;
        Ok(left
            .iter()
            .zip(right.iter())
            .map(|(&x, &y)| interaction.apply(x, y))
            .collect())
    }
}

impl FeatureTransformer for FeatureAugmenter {
    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.check_required(df)?;

        // Derive from the input frame so terms never see each other's output.
        let mut derived: Vec<(String, Vec<f64>)> = Vec::new();
        for term in &self.interactions {
            let values = Self::derive(df, &term.left, &term.right, InteractionType::Multiply)?;
            derived.push((term.name.clone(), values));
        }
        for term in &self.curvatures {
            let values = Self::derive(df, &term.base, &term.base, InteractionType::Square)?;
            derived.push((term.name.clone(), values));
        }

        let mut result = df.clone();
        for (name, values) in derived {
            result.with_column(Series::new(name.into(), values))?;
        }
        Ok(result)
    }

    fn get_feature_names(&self) -> Vec<String> {
        self.interactions
            .iter()
            .map(|t| t.name.clone())
            .chain(self.curvatures.iter().map(|t| t.name.clone()))
            .collect()
    }
}
