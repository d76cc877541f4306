//! Seeded train/validation split

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The four outputs of a train/validation split
#[derive(Debug, Clone)]
pub struct TrainValidationSplit {
    pub x_train: DataFrame,
    pub x_val: DataFrame,
    pub y_train: Array1<f64>,
    pub y_val: Array1<f64>,
}

/// Shuffle rows with a seeded RNG and hold out `ceil(n * test_size)` of them.
///
/// The target column is removed from both feature frames.
pub fn train_validation_split(
    df: &DataFrame,
    target: &str,
    test_size: f64,
    seed: u64,
) -> Result<TrainValidationSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::InvalidInput(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let y = crate::training::column_to_array1(df, target)?;
    let features = df.drop(target)?;

    let n_samples = df.height();
    let n_val = (n_samples as f64 * test_size).ceil() as usize;
    if n_val == 0 || n_val >= n_samples {
        return Err(PipelineError::InvalidInput(format!(
            "cannot hold out {} of {} rows for validation",
            n_val, n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (val_idx, train_idx) = indices.split_at(n_val);

    Ok(TrainValidationSplit {
        x_train: take_rows(&features, train_idx)?,
        x_val: take_rows(&features, val_idx)?,
        y_train: train_idx.iter().map(|&i| y[i]).collect(),
        y_val: val_idx.iter().map(|&i| y[i]).collect(),
    })
}

fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = rows.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}
