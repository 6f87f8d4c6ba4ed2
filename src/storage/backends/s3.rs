//! S3 object store

use super::super::error::{StorageError, StorageResult};
use super::super::traits::ObjectStore;
use crate::config::EtlConfig;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, info};

/// Object store backed by S3 (or any S3-compatible endpoint)
pub struct S3ObjectStore {
    client: Arc<Client>,
}

impl S3ObjectStore {
    /// Build a client from the ambient AWS credential chain plus the optional
    /// endpoint and region in the `etl` section
    pub async fn new(config: &EtlConfig) -> StorageResult<Self> {
        info!("Initializing S3 client");

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(ref endpoint) = config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(ref region) = config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        // Custom endpoints (MinIO, localstack) generally only serve path-style URLs
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        Ok(Self::from_client(Client::from_conf(s3_config)))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Map an SDK failure, turning `NoSuchBucket` / `NoSuchKey` / 404 into not-found errors
fn sdk_error<E>(err: SdkError<E, HttpResponse>, bucket: &str, key: Option<&str>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = err.as_service_error().and_then(|e| e.code()).map(str::to_string);
    let status = err.raw_response().map(|r| r.status().as_u16());
    match (code.as_deref(), key) {
        (Some("NoSuchBucket"), _) => StorageError::BucketNotFound(bucket.to_string()),
        (Some("NoSuchKey") | Some("NotFound"), Some(key)) => {
            StorageError::object_not_found(bucket, key)
        }
        (_, Some(key)) if status == Some(404) => StorageError::object_not_found(bucket, key),
        _ => match &err {
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
                StorageError::unavailable(DisplayErrorContext(&err))
            }
            _ => StorageError::backend(DisplayErrorContext(&err)),
        },
    }
}

/// Percent-encode each key segment for the `x-amz-copy-source` header
fn encode_copy_source(bucket: &str, key: &str) -> String {
    let segments: Vec<_> = key.split('/').map(urlencoding::encode).collect();
    format!("{}/{}", bucket, segments.join("/"))
}

/// Stream `reader` into a new file at `path`
async fn write_stream<R>(mut reader: R, path: &Path) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut file = tokio::fs::File::create(path).await?;
    let written = tokio::io::copy(&mut reader, &mut file).await?;
    file.flush().await?;
    Ok(written)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self, bucket: &str) -> StorageResult<Vec<String>> {
        debug!("Listing objects in {}", bucket);

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| sdk_error(e, bucket, None))?;
            keys.extend(page.contents().iter().filter_map(|o| o.key().map(str::to_string)));
        }

        debug!("Found {} objects in {}", keys.len(), bucket);
        Ok(keys)
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        key: &str,
        dest_bucket: &str,
    ) -> StorageResult<()> {
        debug!("Copying s3://{}/{} to {}", source_bucket, key, dest_bucket);

        self.client
            .copy_object()
            .copy_source(encode_copy_source(source_bucket, key))
            .bucket(dest_bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(e, source_bucket, Some(key)))?;

        Ok(())
    }

    async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()> {
        debug!("Uploading {} to s3://{}/{}", path.display(), bucket, key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| sdk_error(e, bucket, None))?;

        Ok(())
    }

    async fn download_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()> {
        debug!("Downloading s3://{}/{} to {}", bucket, key, path.display());

        let result = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(e, bucket, Some(key)))?;

        let written = write_stream(result.body.into_async_read(), path).await?;
        debug!("Wrote {} bytes to {}", written, path.display());

        Ok(())
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let result = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(e, bucket, Some(key)))?;

        let bytes = result
            .body
            .collect()
            .await
            .map_err(|e| StorageError::backend(format!("Failed to read s3://{bucket}/{key}: {e}")))?
            .into_bytes();

        Ok(bytes.to_vec())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        debug!("Deleting s3://{}/{}", bucket, key);

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(e, bucket, Some(key)))?;

        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) => match sdk_error(e, bucket, Some(key)) {
                StorageError::ObjectNotFound { .. } => Ok(false),
                other => Err(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source_encoding() {
        assert_eq!(encode_copy_source("src", "2020/01/a.nc"), "src/2020/01/a.nc");
        assert_eq!(
            encode_copy_source("src", "run 1/a+b.nc"),
            "src/run%201/a%2Bb.nc"
        );
        assert_eq!(
            encode_copy_source("src", "café/x~y.nc"),
            "src/caf%C3%A9/x~y.nc"
        );
    }

    #[tokio::test]
    async fn test_write_stream_copies_reader_into_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.nc");
        let body = vec![7u8; 64 * 1024 + 3];

        let written = write_stream(&body[..], &path).await.unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_write_stream_fails_for_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("a.nc");

        assert!(write_stream(&b"data"[..], &path).await.is_err());
    }
}
