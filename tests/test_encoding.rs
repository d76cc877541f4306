//! Integration test: encoding partitions consistently

use polars::prelude::*;
use proptest::prelude::*;
use tabreg::error::PipelineError;
use tabreg::feature_engineering::{FeatureAugmenter, FeatureTransformer};
use tabreg::preprocessing::{
    column_names, column_to_f64, encode_partitions, EncoderConfig, TabularEncoder,
};

const LEVELS: [&str; 5] = ["a", "b", "c", "d", "e"];

fn students(n: usize, offset: usize) -> DataFrame {
    let ids: Vec<i64> = (0..n).map(|i| (i + offset) as i64).collect();
    let age: Vec<f64> = (0..n).map(|i| 17.0 + ((i + offset) % 8) as f64).collect();
    let study: Vec<f64> = (0..n).map(|i| 1.0 + ((i * 3 + offset) % 9) as f64 * 0.75).collect();
    let gender: Vec<&str> = (0..n).map(|i| ["female", "male", "other"][(i + offset) % 3]).collect();
    let difficulty: Vec<&str> = (0..n)
        .map(|i| ["easy", "hard", "moderate"][(i * 2 + offset) % 3])
        .collect();

    df!(
        "id" => &ids,
        "age" => &age,
        "study_hours" => &study,
        "gender" => &gender,
        "exam_difficulty" => &difficulty,
    )
    .unwrap()
}

fn config() -> EncoderConfig {
    EncoderConfig::new()
        .with_categorical(["gender", "exam_difficulty"])
        .with_scaled(["age", "study_hours"])
}

#[test]
fn test_indicator_count_is_levels_minus_one() {
    let (encoder, train) = TabularEncoder::new(config()).fit(&students(30, 0)).unwrap();

    assert_eq!(
        column_names(&train),
        vec![
            "age",
            "study_hours",
            "gender_male",
            "gender_other",
            "exam_difficulty_hard",
            "exam_difficulty_moderate",
        ]
    );
    assert_eq!(encoder.schema().len(), 6);
    for name in column_names(&train) {
        assert_eq!(train.column(&name).unwrap().dtype(), &DataType::Float64);
    }
}

#[test]
fn test_partitions_share_training_columns() {
    let train = students(40, 0);
    // Validation only ever sees "female" and a level training never had.
    let validation = df!(
        "id" => &[100i64, 101],
        "age" => &[19.0, 22.0],
        "study_hours" => &[3.0, 4.5],
        "gender" => &["female", "nonbinary"],
        "exam_difficulty" => &["hard", "easy"],
    )
    .unwrap();
    let test = students(12, 7);

    let encoded = encode_partitions(&config(), &train, &validation, Some(&test)).unwrap();
    let train_cols = column_names(&encoded.train);
    assert_eq!(column_names(&encoded.validation), train_cols);
    assert_eq!(column_names(encoded.test.as_ref().unwrap()), train_cols);

    // Missing levels are zero-filled, unseen levels contribute nothing.
    let male = column_to_f64(&encoded.validation, "gender_male").unwrap();
    let other = column_to_f64(&encoded.validation, "gender_other").unwrap();
    assert_eq!(male, vec![0.0, 0.0]);
    assert_eq!(other, vec![0.0, 0.0]);
}

#[test]
fn test_constant_training_column_never_appears() {
    let mut train = students(20, 0);
    train
        .with_column(Series::new("campus".into(), vec![1.0; 20]))
        .unwrap();
    let mut validation = students(5, 3);
    validation
        .with_column(Series::new("campus".into(), vec![1.0, 2.0, 3.0, 4.0, 5.0]))
        .unwrap();

    let encoded = encode_partitions(&config(), &train, &validation, None).unwrap();
    assert_eq!(encoded.dropped_constant_columns(), &["campus".to_string()]);
    assert!(encoded.train.column("campus").is_err());
    assert!(encoded.validation.column("campus").is_err());
}

#[test]
fn test_inexact_constant_column_is_pruned() {
    let mut train = students(3, 0);
    train
        .with_column(Series::new("campus".into(), vec![0.1; 3]))
        .unwrap();
    let validation = students(4, 5);

    let encoded = encode_partitions(&config(), &train, &validation, None).unwrap();
    assert_eq!(encoded.dropped_constant_columns(), &["campus".to_string()]);
    assert!(!column_names(&encoded.train).contains(&"campus".to_string()));
    assert_eq!(column_names(&encoded.validation), column_names(&encoded.train));
}

#[test]
fn test_scaled_training_columns_are_standardized() {
    let (encoder, train) = TabularEncoder::new(config()).fit(&students(50, 0)).unwrap();

    for name in ["age", "study_hours"] {
        let values = column_to_f64(&train, name).unwrap();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-10, "{} mean = {}", name, mean);
        assert!((var.sqrt() - 1.0).abs() < 1e-10, "{} std = {}", name, var.sqrt());
        assert!(encoder.scaler().get(name).is_some());
    }
}

#[test]
fn test_validation_scaled_with_training_statistics() {
    let train = students(30, 0);
    let validation = students(6, 11);
    let encoded = encode_partitions(&config(), &train, &validation, None).unwrap();

    let stats = encoded.scaler().get("age").unwrap();
    let raw = column_to_f64(&validation, "age").unwrap();
    let scaled = column_to_f64(&encoded.validation, "age").unwrap();
    for (r, s) in raw.iter().zip(scaled.iter()) {
        assert!(((r - stats.mean) / stats.std - s).abs() < 1e-12);
    }
}

#[test]
fn test_missing_named_column_fails_fast() {
    let train = students(10, 0).drop("exam_difficulty").unwrap();
    let err = TabularEncoder::new(config()).fit(&train).unwrap_err();
    match err {
        PipelineError::MissingColumns { columns, .. } => {
            assert_eq!(columns, vec!["exam_difficulty".to_string()])
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_augmenter_reports_exactly_the_missing_column() {
    let encoded = df!(
        "study_hours" => &[0.1, -0.3],
        "class_attendance" => &[0.5, 0.2],
        "sleep_hours" => &[1.0, -1.0],
        "exam_difficulty_hard" => &[1.0, 0.0],
        "exam_difficulty_moderate" => &[0.0, 1.0],
        "sleep_quality_good" => &[0.0, 1.0],
        "sleep_quality_poor" => &[1.0, 0.0],
        "study_method_mixed" => &[1.0, 0.0],
        "facility_rating_low" => &[0.0, 0.0],
        "facility_rating_medium" => &[1.0, 0.0],
    )
    .unwrap();

    let augmenter = FeatureAugmenter::exam_score();
    let augmented = augmenter.transform(&encoded).unwrap();
    assert_eq!(augmented.width(), encoded.width() + 13);

    let without_sleep = encoded.drop("sleep_hours").unwrap();
    match augmenter.transform(&without_sleep).unwrap_err() {
        PipelineError::MissingColumns { context, columns } => {
            assert_eq!(context, "linear features");
            assert_eq!(columns, vec!["sleep_hours".to_string()]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

fn level_frame(levels: &[usize]) -> DataFrame {
    let level: Vec<&str> = levels.iter().map(|&i| LEVELS[i]).collect();
    let x: Vec<f64> = (0..levels.len()).map(|i| i as f64).collect();
    df!("x" => &x, "level" => &level).unwrap()
}

proptest! {
    #[test]
    fn prop_validation_columns_match_training(
        train_levels in prop::collection::vec(0usize..4, 2..24),
        val_levels in prop::collection::vec(0usize..5, 1..12),
    ) {
        let config = EncoderConfig::new()
            .with_categorical(["level"])
            .with_id_column(None);
        let train = level_frame(&train_levels);
        let validation = level_frame(&val_levels);

        let encoded = encode_partitions(&config, &train, &validation, None).unwrap();
        prop_assert_eq!(
            column_names(&encoded.validation),
            column_names(&encoded.train)
        );
        prop_assert_eq!(encoded.validation.height(), val_levels.len());
    }
}
