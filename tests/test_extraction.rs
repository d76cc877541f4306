//! Integration test: SQL extraction over CSV-backed connection profiles

use polars::prelude::*;
use std::fs;
use tabreg::data::{
    connect, extract, run_query_and_save, ConnectionProfile, DataLoader, DataSaver,
    ExtractionConfig, ExtractionJob, QuerySource, QuerySpec,
};
use tabreg::error::PipelineError;
use tempfile::tempdir;

fn write_students(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("raw").join("students.csv");
    let mut df = df!(
        "id" => &[1i64, 2, 3, 4, 5],
        "gender" => &["male", "female", "female", "male", "other"],
        "exam_score" => &[71.0, 64.5, 80.0, 58.0, 66.0],
    )
    .unwrap();
    DataSaver::save_csv(&mut df, &path).unwrap();
    path
}

fn config_for(dir: &std::path::Path) -> ExtractionConfig {
    let students = write_students(dir);
    ExtractionConfig::new("clarity")
        .with_connection(
            "clarity",
            ConnectionProfile::default().with_table("students", students),
        )
        .with_data_dir(dir.join("data"))
        .with_sql_dir(dir.join("sql"))
        .with_version("v02")
}

#[test]
fn test_query_registered_table() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());

    let mut conn = connect(&config, "clarity").unwrap();
    assert_eq!(conn.tables(), vec!["students".to_string()]);

    let df = conn
        .query("SELECT id, exam_score FROM students WHERE gender = 'female'")
        .unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.width(), 2);
}

#[test]
fn test_run_query_and_save_writes_rows() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());
    let mut conn = connect(&config, "clarity").unwrap();

    let saved = run_query_and_save(
        &mut conn,
        "SELECT * FROM students",
        "students_v02.csv",
        &config.data_dir,
    )
    .unwrap();

    let loaded = DataLoader::new().load_csv(&saved).unwrap();
    assert_eq!(loaded.shape(), (5, 3));
}

#[test]
fn test_extract_runs_jobs_in_order() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sql")).unwrap();
    fs::write(
        dir.path().join("sql").join("00-population.sql"),
        "SELECT id FROM students WHERE exam_score > 60",
    )
    .unwrap();

    let config = config_for(dir.path())
        .with_job(ExtractionJob::new(
            QuerySpec::Inline("SELECT * FROM students".to_string()),
            "demographics_{version}.csv",
        ))
        .with_job(ExtractionJob::new(
            QuerySpec::File("00-population.sql".into()),
            "population_{version}.csv",
        ));

    let saved = extract(&config).unwrap();
    assert_eq!(
        saved,
        vec![
            dir.path().join("data").join("demographics_v02.csv"),
            dir.path().join("data").join("population_v02.csv"),
        ]
    );

    let population = DataLoader::new().load_csv(&saved[1]).unwrap();
    assert_eq!(population.height(), 4);
}

#[test]
fn test_unknown_connection_is_collaborator_error() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.connection = "warehouse".to_string();

    let err = extract(&config).unwrap_err();
    assert!(matches!(err, PipelineError::UnknownConnection(ref name) if name == "warehouse"));
    assert!(err.is_collaborator());
}

#[test]
fn test_bad_sql_is_query_error() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());
    let mut conn = connect(&config, "clarity").unwrap();

    let err = conn.query("SELECT * FROM missing_table").unwrap_err();
    assert!(matches!(err, PipelineError::QueryError(_)));
    assert!(err.is_collaborator());
}
