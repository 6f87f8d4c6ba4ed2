//! In-memory object store for testing and dry runs

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{
    error::{StorageError, StorageResult},
    traits::ObjectStore,
};

type Buckets = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// Buckets of byte blobs behind a shared lock; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    buckets: Arc<RwLock<Buckets>>,
    unavailable: Arc<RwLock<BTreeSet<String>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bucket (no-op if it already exists)
    pub async fn create_bucket(&self, bucket: &str) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
    }

    /// Store an object, creating the bucket on the fly
    pub async fn put_bytes(&self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), bytes.into());
    }

    /// Make every request against `bucket` fail as if the service were down
    pub async fn set_unavailable(&self, bucket: &str) {
        self.unavailable.write().await.insert(bucket.to_string());
    }

    /// Sorted keys of a bucket; empty if the bucket does not exist
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    async fn check_available(&self, bucket: &str) -> StorageResult<()> {
        if self.unavailable.read().await.contains(bucket) {
            return Err(StorageError::unavailable(format!(
                "bucket {bucket} is unreachable"
            )));
        }
        Ok(())
    }

    async fn read_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.check_available(bucket).await?;
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::object_not_found(bucket, key))
    }

    async fn write_object(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        self.check_available(bucket).await?;
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        objects.insert(key.to_string(), bytes);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_keys(&self, bucket: &str) -> StorageResult<Vec<String>> {
        self.check_available(bucket).await?;
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        key: &str,
        dest_bucket: &str,
    ) -> StorageResult<()> {
        let bytes = self.read_object(source_bucket, key).await?;
        self.write_object(dest_bucket, key, bytes).await
    }

    async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()> {
        let bytes = tokio::fs::read(path).await?;
        self.write_object(bucket, key, bytes).await
    }

    async fn download_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()> {
        let bytes = self.read_object(bucket, key).await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.read_object(bucket, key).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.check_available(bucket).await?;
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        // S3 DeleteObject succeeds for absent keys
        objects.remove(key);
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        match self.read_object(bucket, key).await {
            Ok(_) => Ok(true),
            Err(StorageError::ObjectNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
