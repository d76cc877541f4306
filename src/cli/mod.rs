//! tabreg CLI Module
//!
//! Command-line interface for running the pipeline, extracting source tables and
//! inspecting data.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{PipelineConfig, ProjectPaths};
use crate::data::{extract, DataLoader, ExtractionConfig};
use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::preprocessing::column_to_f64;
use crate::telemetry::LoggingConfig;
use crate::utils::cohens_d;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn metric_row(name: &str, value: f64) {
    println!("  {:<16} {}", muted(name), format!("{:.4}", value).white().bold());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tabreg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tabular regression pipeline: encode, augment, fit OLS, predict")]
#[command(long_about = None)]
pub struct Cli {
    /// Project root holding data-raw/, data/, logs/ and sql/
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline on data-raw/train.csv and data-raw/test.csv
    Run {
        /// Pipeline configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Version tag for the submission file name
        #[arg(long)]
        version: Option<String>,
    },

    /// Run the configured SQL extraction jobs
    Extract {
        /// Extraction configuration file (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Show data file information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Cohen's d between two groups of a column
    EffectSize {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Column holding the group labels
        #[arg(long)]
        group_col: String,

        /// Numeric column to compare
        #[arg(long)]
        value_col: String,

        /// Label of the first group
        #[arg(long)]
        group_a: String,

        /// Label of the second group
        #[arg(long)]
        group_b: String,
    },
}

impl Cli {
    pub fn project_paths(&self) -> ProjectPaths {
        match &self.root {
            Some(root) => ProjectPaths::from_root(root),
            None => ProjectPaths::discover(),
        }
    }

    /// Logging settings for this invocation. Without an explicit file, events are
    /// appended to the project's `logs/main.log`.
    pub fn logging_config(&self, paths: &ProjectPaths) -> crate::error::Result<LoggingConfig> {
        let mut logging = match &self.command {
            Commands::Run { config: Some(path), .. } => PipelineConfig::load(path)?.logging,
            _ => LoggingConfig::default(),
        };
        if logging.file.is_none() {
            logging.file = Some(paths.log_file.clone());
        }
        Ok(logging)
    }
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "csv" => Ok(DataLoader::new().load_csv(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", ext),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(
    paths: &ProjectPaths,
    config_path: Option<&Path>,
    version: Option<&str>,
) -> anyhow::Result<()> {
    section("Run");

    let mut config = match config_path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(version) = version {
        config = config.with_version(version);
    }

    step_run("Encoding, fitting and predicting");
    let start = Instant::now();
    let (report, saved) = Pipeline::new(config).run_from_paths(paths)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!(
        "  {:<16} {}",
        muted("Features"),
        report.feature_columns.len().to_string().white()
    );
    println!(
        "  {:<16} {}",
        muted("Dropped const"),
        report.dropped_constant_columns.len().to_string().white()
    );
    println!(
        "  {:<16} {}",
        muted("Condition"),
        format!("{:.3e}", report.condition_number).white()
    );
    metric_row("MSE", report.metrics.mse);
    metric_row("RMSE", report.metrics.rmse);
    metric_row("MAE", report.metrics.mae);
    metric_row("R²", report.metrics.r2);
    println!();
    step_ok(&format!("Saved {}", saved.display()));
    println!();

    Ok(())
}

pub fn cmd_extract(paths: &ProjectPaths, config_path: &Path) -> anyhow::Result<()> {
    section("Extract");

    let mut config = ExtractionConfig::load(config_path)?;
    if config.data_dir.is_relative() {
        config.data_dir = paths.root.join(&config.data_dir);
    }
    if config.sql_dir.is_relative() {
        config.sql_dir = paths.root.join(&config.sql_dir);
    }

    let saved = extract(&config)?;
    for path in &saved {
        step_ok(&path.display().to_string());
    }
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_data(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));

    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    Ok(())
}

/// Values of `value_col` for the rows whose `group_col` equals `label`, nulls skipped
pub fn group_values(
    df: &DataFrame,
    group_col: &str,
    value_col: &str,
    label: &str,
) -> crate::error::Result<Vec<f64>> {
    let groups = df
        .column(group_col)
        .map_err(|_| PipelineError::FeatureNotFound(group_col.to_string()))?
        .cast(&DataType::String)?;
    let values = column_to_f64(df, value_col)?;

    Ok(groups
        .str()?
        .into_iter()
        .zip(values)
        .filter(|(group, value)| *group == Some(label) && !value.is_nan())
        .map(|(_, value)| value)
        .collect())
}

pub fn cmd_effect_size(
    data_path: &Path,
    group_col: &str,
    value_col: &str,
    group_a: &str,
    group_b: &str,
) -> anyhow::Result<()> {
    section("Effect Size");

    let df = load_data(data_path)?;
    let a = group_values(&df, group_col, value_col, group_a)?;
    let b = group_values(&df, group_col, value_col, group_b)?;
    let d = cohens_d(&a, &b)?;

    println!("  {:<16} {}", muted(group_a), format!("n = {}", a.len()).white());
    println!("  {:<16} {}", muted(group_b), format!("n = {}", b.len()).white());
    metric_row("Cohen's d", d);
    println!();
    Ok(())
}
