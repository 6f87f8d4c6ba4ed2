//! Testing utilities and fixtures
//!
//! Shared by unit tests and the integration tests under `tests/`: a sample
//! configuration file and a [`TestContext`] bundling the in-memory object
//! store, the mock process runner and the in-memory warehouse.

use crate::config::VariablesLoader;
use crate::pipeline::Pipeline;
use crate::scratch::ScratchSpace;
use crate::storage::MemoryObjectStore;
use crate::subprocess::MockProcessRunner;
use crate::warehouse::MemoryWarehouse;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const SOURCE_BUCKET: &str = "noaa-source";
pub const RAW_DATA_BUCKET: &str = "raw-data";
pub const STAGING_BUCKET: &str = "staging";

/// A `variables.json` in the shape deployments use
pub fn sample_variables_json() -> String {
    serde_json::json!({
        "etl": {
            "source_bucket": SOURCE_BUCKET,
            "raw_data_bucket": RAW_DATA_BUCKET,
            "temps3dir": STAGING_BUCKET,
            "jdbc": {
                "db": "dev",
                "port": 5439,
                "schema": "climate",
                "dbtable": {
                    "salinity": "salinity_table",
                    "temperature": "temp_table"
                },
                "user_name": "loader",
                "password": "hunter2",
                "url": "warehouse.example.com"
            }
        },
        "access": {
            "access_key": "AKIAEXAMPLE",
            "secret_access_key": "very-secret"
        }
    })
    .to_string()
}

/// Write `json` as `variables.json` inside `dir`
pub fn write_variables(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("variables.json");
    std::fs::write(&path, json).unwrap_or_else(|e| panic!("writing {}: {e}", path.display()));
    path
}

/// Everything a pipeline run needs, backed by in-memory doubles
pub struct TestContext {
    pub temp_dir: TempDir,
    pub variables_path: PathBuf,
    pub store: MemoryObjectStore,
    pub runner: MockProcessRunner,
    pub warehouse: MemoryWarehouse,
}

impl TestContext {
    /// Context with the sample configuration and its three buckets created
    pub async fn new() -> Result<Self> {
        Self::with_variables(&sample_variables_json()).await
    }

    pub async fn with_variables(json: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let variables_path = write_variables(temp_dir.path(), json);

        let store = MemoryObjectStore::new();
        for bucket in [SOURCE_BUCKET, RAW_DATA_BUCKET, STAGING_BUCKET] {
            store.create_bucket(bucket).await;
        }
        let warehouse = MemoryWarehouse::new(store.clone());

        Ok(Self {
            temp_dir,
            variables_path,
            store,
            runner: MockProcessRunner::new(),
            warehouse,
        })
    }

    pub fn loader(&self) -> VariablesLoader {
        VariablesLoader::new(&self.variables_path)
    }

    /// A pipeline over this context's doubles with its own scratch space
    pub fn pipeline(&self) -> Result<Pipeline> {
        let scratch = ScratchSpace::create_in(self.temp_dir.path())?;
        Ok(Pipeline::new(
            self.loader(),
            Arc::new(self.store.clone()),
            Arc::new(self.runner.clone()),
            Arc::new(self.warehouse.clone()),
            scratch,
        ))
    }

    /// Put a data file into the source bucket
    pub async fn add_source_file(&self, key: &str) {
        self.store
            .put_bytes(SOURCE_BUCKET, key, b"CDF\x01".to_vec())
            .await;
    }
}
