//! Stager
//!
//! Writes a feature's table to a single local CSV file, uploads it to the
//! staging bucket as `{feature}.csv` and removes the local copy.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::StageError;

use crate::config::{Variables, VariablesLoader};
use crate::features::Table;
use crate::scratch::ScratchSpace;
use crate::storage::{staged_key, ObjectStore, CSV_SUFFIX};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Stager {
    store: Arc<dyn ObjectStore>,
    loader: VariablesLoader,
    work_dir: PathBuf,
}

impl Stager {
    pub fn new(store: Arc<dyn ObjectStore>, loader: VariablesLoader, scratch: &ScratchSpace) -> Self {
        Self {
            store,
            loader,
            work_dir: scratch.path().join("staging"),
        }
    }

    /// Stage `table` under `{feature}.csv` and return the configuration the
    /// loader needs
    pub async fn stage(&self, table: Table, feature: &str) -> Result<Variables, StageError> {
        let variables = self.loader.load().await?;

        let out_dir = self
            .work_dir
            .join(format!("tmp_{}_{}", feature, uuid::Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&out_dir).await?;

        let result = self
            .write_and_upload(table, feature, &variables.etl.temps3dir, &out_dir)
            .await;

        if let Err(e) = tokio::fs::remove_dir_all(&out_dir).await {
            warn!("Could not remove {}: {}", out_dir.display(), e);
        }

        result?;
        Ok(variables)
    }

    async fn write_and_upload(
        &self,
        table: Table,
        feature: &str,
        bucket: &str,
        out_dir: &Path,
    ) -> Result<(), StageError> {
        let rows = table.len();
        let mut buffer = Vec::new();
        table
            .write_csv(&mut buffer)
            .map_err(|source| StageError::Write {
                feature: feature.to_string(),
                source,
            })?;
        drop(table);

        let part = out_dir.join(format!("part-00000{CSV_SUFFIX}"));
        tokio::fs::write(&part, buffer).await?;

        let csv_file = locate_single_csv(out_dir).await?;
        let key = staged_key(feature);
        debug!("Uploading {} ({} rows) as {}", csv_file.display(), rows, key);

        self.store
            .upload_file(bucket, &key, &csv_file)
            .await
            .map_err(|source| StageError::Upload {
                bucket: bucket.to_string(),
                key: key.clone(),
                source,
            })?;

        info!("Staged {} row(s) for {} at {}/{}", rows, feature, bucket, key);
        Ok(())
    }
}

/// The one `.csv` file in `dir`
pub async fn locate_single_csv(dir: &Path) -> Result<PathBuf, StageError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            found.push(path);
        }
    }

    match found.len() {
        1 => Ok(found.remove(0)),
        n => Err(StageError::OutputCount {
            dir: dir.to_path_buf(),
            found: n,
        }),
    }
}
