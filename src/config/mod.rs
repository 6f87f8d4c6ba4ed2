//! Pipeline configuration
//!
//! Everything the pipeline needs comes from a single `variables.json` file.
//! The file is read again at every call site that needs it; nothing is cached
//! between components.

pub mod error;
pub mod loader;
pub mod validator;


pub use error::ConfigError;
pub use loader::VariablesLoader;
pub use validator::VariablesValidator;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_VARIABLES_PATH: &str = "variables.json";

/// Root of `variables.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    pub etl: EtlConfig,
    pub access: AccessConfig,
}

/// The `etl` section: buckets, extraction and warehouse settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Bucket new data files appear in
    pub source_bucket: String,

    /// Bucket holding the raw copies we already processed
    pub raw_data_bucket: String,

    /// Bucket used to stage per-feature CSV files before loading
    pub temps3dir: String,

    /// Custom S3 endpoint (MinIO, localstack)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Region override for the S3 client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Features to extract; defaults to every key of `jdbc.dbtable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,

    #[serde(default)]
    pub extractor: ExtractorConfig,

    pub jdbc: JdbcConfig,
}

/// Warehouse connection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JdbcConfig {
    pub db: String,
    pub port: u16,
    pub schema: String,

    /// Feature name to destination table
    pub dbtable: BTreeMap<String, String>,

    pub user_name: String,
    pub password: Secret,

    /// Warehouse host name
    pub url: String,

    /// What happens to the staged CSV after a load attempt
    #[serde(default)]
    pub cleanup: CleanupPolicy,

    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
}

/// Credentials embedded in the warehouse COPY statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    pub access_key: String,
    pub secret_access_key: Secret,
}

/// External extraction tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_extractor_program")]
    pub program: String,

    /// Argument template; `{input}` and `{feature}` are substituted per call
    #[serde(default = "default_extractor_args")]
    pub args: Vec<String>,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(with = "humantime_serde", default = "default_extractor_timeout")]
    pub timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: default_extractor_program(),
            args: default_extractor_args(),
            format: OutputFormat::default(),
            timeout: default_extractor_timeout(),
        }
    }
}

/// Shape of the extraction tool's standard output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Comma separated, first line is the header
    Csv,
    /// Columns separated by runs of whitespace, header may start with `#`
    #[default]
    Whitespace,
}

/// When the staged CSV is removed from the staging bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Only after the COPY committed; failed loads keep their staged file
    #[default]
    OnSuccess,
    /// After every load attempt, successful or not
    Always,
}

/// A string that never shows up in logs or debug output
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Variables {
    /// Features to extract from every copied file
    pub fn features(&self) -> Vec<String> {
        match &self.etl.features {
            Some(features) => features.clone(),
            None => self.etl.jdbc.dbtable.keys().cloned().collect(),
        }
    }

    /// Destination table for a feature, if one is mapped
    pub fn table_for(&self, feature: &str) -> Option<&str> {
        self.etl.jdbc.dbtable.get(feature).map(String::as_str)
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_extractor_program() -> String {
    "cdo".to_string()
}

fn default_extractor_args() -> Vec<String> {
    vec![
        "-s".to_string(),
        "outputtab,date,time,lat,lon,value".to_string(),
        "-selname,{feature}".to_string(),
        "{input}".to_string(),
    ]
}

fn default_extractor_timeout() -> Duration {
    Duration::from_secs(600)
}
