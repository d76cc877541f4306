//! Tracing subscriber setup
//!
//! Events go to the console and, when a log file is configured, are appended
//! to it as well. ERROR events carry the source line number; other levels do not.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{
    filter::filter_fn, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

fn default_level() -> String {
    "debug".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for this crate's events when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Append-mode log file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn directive(&self) -> String {
        format!("tabreg={}", self.level)
    }
}

fn is_error(meta: &tracing::Metadata<'_>) -> bool {
    *meta.level() == Level::ERROR
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let console_errors = fmt::layer()
        .with_line_number(true)
        .with_filter(filter_fn(is_error));
    let console_rest = fmt::layer().with_filter(filter_fn(|meta| !is_error(meta)));

    let (file_errors, file_rest) = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = Arc::new(OpenOptions::new().create(true).append(true).open(path)?);

            let errors = fmt::layer()
                .with_ansi(false)
                .with_line_number(true)
                .with_writer(Arc::clone(&file))
                .with_filter(filter_fn(is_error));
            let rest = fmt::layer()
                .with_ansi(false)
                .with_writer(file)
                .with_filter(filter_fn(|meta| !is_error(meta)));
            (Some(errors), Some(rest))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_errors)
        .with(console_rest)
        .with(file_errors)
        .with(file_rest)
        .try_init()
        .map_err(|e| PipelineError::ConfigError(format!("logging already initialized: {}", e)))
}
