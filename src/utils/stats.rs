//! Effect-size statistics

use crate::error::{PipelineError, Result};

/// Cohen's d: the standardized mean difference between two independent groups,
/// using the pooled sample standard deviation (ddof = 1).
///
/// Positive when `group_a` has the higher mean.
pub fn cohens_d(group_a: &[f64], group_b: &[f64]) -> Result<f64> {
    let (n1, n2) = (group_a.len(), group_b.len());
    if n1 < 2 || n2 < 2 {
        return Err(PipelineError::InvalidInput(format!(
            "each group needs at least 2 observations, got {} and {}",
            n1, n2
        )));
    }

    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let var = |xs: &[f64], m: f64| {
        xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() - 1) as f64
    };

    let (u1, u2) = (mean(group_a), mean(group_b));
    let (s1, s2) = (var(group_a, u1), var(group_b, u2));

    let pooled = (((n1 - 1) as f64 * s1 + (n2 - 1) as f64 * s2) / (n1 + n2 - 2) as f64).sqrt();
    if pooled == 0.0 || !pooled.is_finite() {
        return Err(PipelineError::InvalidInput(
            "pooled standard deviation is zero".to_string(),
        ));
    }

    Ok((u1 - u2) / pooled)
}
