//! Source differ
//!
//! Finds the data files present in the source bucket but not yet in the
//! raw-data bucket and copies them over, server side, under the same key.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::SyncError;

use crate::config::{ConfigError, VariablesLoader};
use crate::storage::{is_netcdf, ObjectStore, StorageError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to do when a bucket cannot be listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingPolicy {
    /// Return the listing error to the caller
    #[default]
    Strict,
    /// Log the error and treat the bucket as empty
    Lenient,
}

/// Keys in `source` that are not present as `.nc` files in `destination`
///
/// Destination keys without the `.nc` suffix never count as present.
pub fn missing_keys<S, D>(source: S, destination: D) -> BTreeSet<String>
where
    S: IntoIterator<Item = String>,
    D: IntoIterator<Item = String>,
{
    let present: BTreeSet<String> = destination.into_iter().filter(|k| is_netcdf(k)).collect();
    source
        .into_iter()
        .filter(|k| !present.contains(k))
        .collect()
}

pub struct SourceDiffer {
    store: Arc<dyn ObjectStore>,
    loader: VariablesLoader,
    policy: ListingPolicy,
}

impl SourceDiffer {
    pub fn new(store: Arc<dyn ObjectStore>, loader: VariablesLoader) -> Self {
        Self {
            store,
            loader,
            policy: ListingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ListingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Source and raw-data bucket names, read fresh from the configuration file
    pub async fn resolve_bucket_links(&self) -> Result<(String, String), ConfigError> {
        let variables = self.loader.load().await?;
        Ok((variables.etl.source_bucket, variables.etl.raw_data_bucket))
    }

    /// Keys in `source` that are missing from `destination`
    pub async fn compute_missing(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<BTreeSet<String>, SyncError> {
        let source_keys = self.list(source).await?;
        let dest_keys = self.list(destination).await?;

        let missing = missing_keys(source_keys, dest_keys);
        info!(
            "{} file(s) in {} are missing from {}",
            missing.len(),
            source,
            destination
        );
        Ok(missing)
    }

    /// Copy every missing `.nc` file into the raw-data bucket
    ///
    /// Returns the copied keys in sorted order. A failed copy aborts; files
    /// copied before it stay in the destination and are listed in the error.
    pub async fn sync(&self) -> Result<Vec<String>, SyncError> {
        let (source, destination) = self.resolve_bucket_links().await?;
        let missing = self.compute_missing(&source, &destination).await?;

        let mut copied = Vec::with_capacity(missing.len());
        for key in missing {
            if !is_netcdf(&key) {
                warn!("Skipping {}: not a NetCDF file", key);
                continue;
            }

            if let Err(source_err) = self.store.copy_object(&source, &key, &destination).await {
                return Err(SyncError::Copy {
                    key,
                    copied,
                    source: source_err,
                });
            }
            debug!("Copied {} from {} to {}", key, source, destination);
            copied.push(key);
        }

        info!("Copied {} file(s) into {}", copied.len(), destination);
        Ok(copied)
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>, SyncError> {
        match self.store.list_keys(bucket).await {
            Ok(keys) => Ok(keys),
            Err(e) => self.degrade(bucket, e),
        }
    }

    fn degrade(&self, bucket: &str, err: StorageError) -> Result<Vec<String>, SyncError> {
        match self.policy {
            ListingPolicy::Strict => Err(SyncError::Listing {
                bucket: bucket.to_string(),
                source: err,
            }),
            ListingPolicy::Lenient => {
                warn!("Treating {} as empty, listing failed: {}", bucket, err);
                Ok(Vec::new())
            }
        }
    }
}
