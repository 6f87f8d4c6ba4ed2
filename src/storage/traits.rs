//! Object storage trait

use async_trait::async_trait;
use std::path::Path;

use super::error::StorageResult;

/// Bucket/key operations the pipeline performs against object storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every key in a bucket
    async fn list_keys(&self, bucket: &str) -> StorageResult<Vec<String>>;

    /// Server-side copy of `key` from `source_bucket` into `dest_bucket` under the same key
    async fn copy_object(&self, source_bucket: &str, key: &str, dest_bucket: &str)
        -> StorageResult<()>;

    /// Upload a local file
    async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()>;

    /// Download an object into a local file
    async fn download_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()>;

    /// Read an object into memory
    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Check whether an object exists
    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;
}
