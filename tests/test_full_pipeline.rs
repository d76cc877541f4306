//! Integration test: Full pipeline (split → encode → augment → fit → predict)

use polars::prelude::*;
use std::collections::HashMap;
use tabreg::config::{PipelineConfig, ProjectPaths};
use tabreg::data::{DataLoader, DataSaver};
use tabreg::pipeline::Pipeline;
use tabreg::preprocessing::{column_names, column_to_f64};
use tempfile::tempdir;

fn create_student_dataset(n: usize, offset: usize, with_target: bool) -> DataFrame {
    let mut ids = Vec::with_capacity(n);
    let mut age = Vec::with_capacity(n);
    let mut gender = Vec::with_capacity(n);
    let mut course = Vec::with_capacity(n);
    let mut study_hours = Vec::with_capacity(n);
    let mut class_attendance = Vec::with_capacity(n);
    let mut internet_access = Vec::with_capacity(n);
    let mut sleep_hours = Vec::with_capacity(n);
    let mut sleep_quality = Vec::with_capacity(n);
    let mut study_method = Vec::with_capacity(n);
    let mut facility_rating = Vec::with_capacity(n);
    let mut exam_difficulty = Vec::with_capacity(n);
    let mut exam_score = Vec::with_capacity(n);

    for k in 0..n {
        let i = k + offset;
        let study = 1.0 + ((i * 13) % 17) as f64 * 0.4;
        let attendance = 50.0 + ((i * 11) % 23) as f64 * 2.0;
        let sleep = 4.0 + ((i * 5) % 11) as f64 * 0.5;
        let difficulty = ["easy", "hard", "moderate"][(i / 2) % 3];
        let quality = ["average", "good", "poor"][(i * 7) % 3];

        ids.push(i as i64);
        age.push(17.0 + ((i * 7) % 9) as f64);
        gender.push(["female", "male", "other"][i % 3]);
        course.push(["b.sc", "b.tech", "ba", "bba"][(i / 3) % 4]);
        study_hours.push(study);
        class_attendance.push(attendance);
        internet_access.push(["no", "yes"][(i / 5) % 2]);
        sleep_hours.push(sleep);
        sleep_quality.push(quality);
        study_method.push(["mixed", "single"][(i / 7) % 2]);
        facility_rating.push(["high", "low", "medium"][(i / 4) % 3]);
        exam_difficulty.push(difficulty);

        let difficulty_effect = match difficulty {
            "hard" => -6.0,
            "moderate" => -2.5,
            _ => 0.0,
        };
        let quality_effect = match quality {
            "good" => 3.0,
            "poor" => -3.0,
            _ => 0.0,
        };
        let noise = ((i * 37) % 10) as f64 / 10.0 - 0.45;
        exam_score.push(
            20.0 + 5.0 * study + 0.3 * attendance + 1.5 * sleep
                + difficulty_effect
                + quality_effect
                + noise,
        );
    }

    let mut df = df!(
        "id" => &ids,
        "age" => &age,
        "gender" => &gender,
        "course" => &course,
        "study_hours" => &study_hours,
        "class_attendance" => &class_attendance,
        "internet_access" => &internet_access,
        "sleep_hours" => &sleep_hours,
        "sleep_quality" => &sleep_quality,
        "study_method" => &study_method,
        "facility_rating" => &facility_rating,
        "exam_difficulty" => &exam_difficulty,
    )
    .unwrap();

    if with_target {
        df.with_column(Series::new("exam_score".into(), exam_score))
            .unwrap();
    }
    df
}

fn predictions_by_id(submission: &DataFrame) -> HashMap<i64, f64> {
    let ids = column_to_f64(submission, "id").unwrap();
    let preds = column_to_f64(submission, "exam_score").unwrap();
    ids.into_iter()
        .map(|id| id as i64)
        .zip(preds)
        .collect()
}

#[test]
fn test_full_regression_pipeline() {
    let train = create_student_dataset(120, 0, true);
    let test = create_student_dataset(30, 1000, false);

    let report = Pipeline::new(PipelineConfig::default())
        .run(&train, &test)
        .unwrap();

    // ceil(120 * 0.2) = 24 validation rows
    assert_eq!(report.train_shape.0, 96);
    assert_eq!(report.validation_shape.0, 24);
    assert_eq!(report.test_shape.0, 30);
    assert_eq!(report.train_shape.1, report.validation_shape.1);
    assert_eq!(report.train_shape.1, report.test_shape.1);

    // Augmented terms are part of the feature set
    assert!(report.feature_columns.contains(&"study_hours_curve".to_string()));
    assert!(report
        .feature_columns
        .contains(&"study_method_mixed_facility_rating__low".to_string()));

    assert!(report.metrics.rmse >= 0.0);
    assert!(report.metrics.rmse.is_finite());
    assert!(report.metrics.r2 > 0.8);
    assert!(report.condition_number > 1.0);

    assert_eq!(column_names(&report.submission), vec!["id", "exam_score"]);
    assert_eq!(report.submission.height(), 30);
    let preds = column_to_f64(&report.submission, "exam_score").unwrap();
    assert!(preds.iter().all(|p| p.is_finite()));
}

#[test]
fn test_spec_columns_without_course_or_internet() {
    let train = create_student_dataset(120, 0, true)
        .drop_many(["course", "internet_access"]);
    let test = create_student_dataset(20, 500, false)
        .drop_many(["course", "internet_access"]);

    let config = PipelineConfig::default().with_categorical([
        "gender",
        "study_method",
        "sleep_quality",
        "facility_rating",
        "exam_difficulty",
    ]);
    let report = Pipeline::new(config).run(&train, &test).unwrap();

    assert_eq!(report.train_shape.1, report.test_shape.1);
    assert!(report.metrics.rmse >= 0.0);
    let preds = column_to_f64(&report.submission, "exam_score").unwrap();
    assert!(preds.iter().all(|p| p.is_finite()));
}

#[test]
fn test_test_row_order_does_not_change_predictions() {
    let train = create_student_dataset(120, 0, true);
    let test = create_student_dataset(25, 300, false);
    let pipeline = Pipeline::new(PipelineConfig::default());

    let forward = pipeline.run(&train, &test).unwrap();
    let reversed = pipeline.run(&train, &test.reverse()).unwrap();

    let a = predictions_by_id(&forward.submission);
    let b = predictions_by_id(&reversed.submission);
    assert_eq!(a.len(), 25);
    for (id, pred) in &a {
        assert!((pred - b[id]).abs() < 1e-9, "id {} differs", id);
    }
}

#[test]
fn test_missing_augmenter_input_stops_the_run() {
    let train = create_student_dataset(60, 0, true).drop("sleep_hours").unwrap();
    let test = create_student_dataset(10, 100, false).drop("sleep_hours").unwrap();
    let config = PipelineConfig::default().with_scaled(["age", "study_hours", "class_attendance"]);

    let err = Pipeline::new(config).run(&train, &test).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required columns for linear features: [\"sleep_hours\"]"
    );
}

#[test]
fn test_run_from_paths_writes_submission() {
    let dir = tempdir().unwrap();
    let paths = ProjectPaths::from_root(dir.path());

    let mut train = create_student_dataset(100, 0, true);
    let mut test = create_student_dataset(15, 2000, false);
    DataSaver::save_csv(&mut train, paths.train_csv()).unwrap();
    DataSaver::save_csv(&mut test, paths.test_csv()).unwrap();

    let config = PipelineConfig::default().with_version("v09");
    let (report, saved) = Pipeline::new(config).run_from_paths(&paths).unwrap();

    assert_eq!(saved, dir.path().join("data").join("v09-submission.csv"));
    let written = DataLoader::new().load_csv(&saved).unwrap();
    assert_eq!(written.shape(), (15, 2));
    assert_eq!(column_names(&written), vec!["id", "exam_score"]);
    assert_eq!(report.submission.height(), 15);
}
