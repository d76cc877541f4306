//! SQL extraction of source tables into versioned CSV files
//!
//! A named [`ConnectionProfile`] registers CSV-backed tables with a polars
//! [`SQLContext`]. Each [`ExtractionJob`] runs one query against it and saves
//! the result under the data directory, in the order the jobs are listed.

use super::loader::{DataLoader, DataSaver};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use polars::sql::SQLContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a query's SQL text comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySpec {
    /// SQL given directly
    Inline(String),
    /// A `.sql` file, relative paths resolved against the SQL directory
    File(PathBuf),
}

impl QuerySpec {
    /// SQL text for this query. Files are read as UTF-8.
    pub fn resolve(&self, sql_dir: &Path) -> Result<String> {
        match self {
            QuerySpec::Inline(sql) => Ok(sql.clone()),
            QuerySpec::File(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    sql_dir.join(path)
                };
                fs::read_to_string(&path).map_err(|e| {
                    PipelineError::QueryError(format!("{}: {}", path.display(), e))
                })
            }
        }
    }
}

/// One query and the file name its result is saved under.
/// `{version}` in the name is replaced by the configured version tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub query: QuerySpec,
    pub output_name: String,
}

impl ExtractionJob {
    pub fn new(query: QuerySpec, output_name: &str) -> Self {
        Self {
            query,
            output_name: output_name.to_string(),
        }
    }

    pub fn output_file(&self, version: &str) -> String {
        self.output_name.replace("{version}", version)
    }
}

/// A table made visible to SQL under `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSource {
    pub name: String,
    pub path: PathBuf,
}

/// The set of tables a named connection exposes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub tables: Vec<TableSource>,
}

impl ConnectionProfile {
    pub fn with_table(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.tables.push(TableSource {
            name: name.to_string(),
            path: path.into(),
        });
        self
    }
}

fn default_sql_dir() -> PathBuf {
    PathBuf::from("sql/extracts")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_version() -> String {
    "v01".to_string()
}

/// Extraction run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Profile used by [`extract`]
    pub connection: String,

    /// Known connection profiles by name
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionProfile>,

    /// Jobs, run in order
    #[serde(default)]
    pub jobs: Vec<ExtractionJob>,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_sql_dir")]
    pub sql_dir: PathBuf,

    #[serde(default = "default_version")]
    pub version: String,
}

impl ExtractionConfig {
    pub fn new(connection: &str) -> Self {
        Self {
            connection: connection.to_string(),
            connections: BTreeMap::new(),
            jobs: Vec::new(),
            data_dir: default_data_dir(),
            sql_dir: default_sql_dir(),
            version: default_version(),
        }
    }

    pub fn with_connection(mut self, name: &str, profile: ConnectionProfile) -> Self {
        self.connections.insert(name.to_string(), profile);
        self
    }

    pub fn with_job(mut self, job: ExtractionJob) -> Self {
        self.jobs.push(job);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_sql_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sql_dir = dir.into();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Anything that can answer a SQL query with a frame
pub trait QuerySource {
    fn query(&mut self, sql: &str) -> Result<DataFrame>;
}

/// SQL over a connection profile's registered tables
pub struct SqlConnection {
    name: String,
    ctx: SQLContext,
}

impl SqlConnection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered table names
    pub fn tables(&self) -> Vec<String> {
        self.ctx.get_tables()
    }
}

impl QuerySource for SqlConnection {
    fn query(&mut self, sql: &str) -> Result<DataFrame> {
        self.ctx
            .execute(sql)
            .and_then(|lf| lf.collect())
            .map_err(|e| PipelineError::QueryError(e.to_string()))
    }
}

/// Open the named connection profile.
///
/// An unknown name is [`PipelineError::UnknownConnection`]; a table file that
/// cannot be read is [`PipelineError::ConnectionError`].
pub fn connect(config: &ExtractionConfig, name: &str) -> Result<SqlConnection> {
    let profile = config
        .connections
        .get(name)
        .ok_or_else(|| PipelineError::UnknownConnection(name.to_string()))?;

    let loader = DataLoader::new();
    let mut ctx = SQLContext::new();
    for table in &profile.tables {
        let df = loader.load_csv(&table.path).map_err(|e| {
            PipelineError::ConnectionError(format!("{} (table '{}'): {}", name, table.name, e))
        })?;
        ctx.register(&table.name, df.lazy());
    }

    debug!(connection = name, tables = profile.tables.len(), "Connected");
    Ok(SqlConnection {
        name: name.to_string(),
        ctx,
    })
}

/// Run `sql` and save the result to `data_dir/output_name`. Returns the saved path.
pub fn run_query_and_save(
    source: &mut dyn QuerySource,
    sql: &str,
    output_name: &str,
    data_dir: &Path,
) -> Result<PathBuf> {
    let mut df = source.query(sql)?;
    let save_path = data_dir.join(output_name);
    DataSaver::save_csv(&mut df, &save_path)?;

    info!("Query saved to: {}", save_path.display());
    info!("Rows returned: {}", df.height());
    Ok(save_path)
}

/// Run every configured job, in order, over the configured connection
pub fn extract(config: &ExtractionConfig) -> Result<Vec<PathBuf>> {
    let mut connection = connect(config, &config.connection)?;

    let mut saved = Vec::with_capacity(config.jobs.len());
    for job in &config.jobs {
        let sql = job.query.resolve(&config.sql_dir)?;
        let path = run_query_and_save(
            &mut connection,
            &sql,
            &job.output_file(&config.version),
            &config.data_dir,
        )?;
        saved.push(path);
    }

    debug!("Extraction complete.");
    Ok(saved)
}
