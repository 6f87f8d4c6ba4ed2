//! Error types for the object storage layer

use crate::error::{ErrorCode, EtlError};
use std::fmt;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bucket does not exist or is not visible to the caller
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// Object does not exist
    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    /// Storage backend unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request reached the backend and failed there
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Create an object not found error
    pub fn object_not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable<E: fmt::Display>(msg: E) -> Self {
        Self::Unavailable(msg.to_string())
    }

    /// Create a backend error
    pub fn backend<E: fmt::Display>(msg: E) -> Self {
        Self::Backend(msg.to_string())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BucketNotFound(_) | Self::ObjectNotFound { .. })
    }
}

/// Convert StorageError to EtlError
impl From<StorageError> for EtlError {
    fn from(err: StorageError) -> Self {
        let (code, bucket) = match &err {
            StorageError::Io(_) => (ErrorCode::STORAGE_IO_ERROR, None),
            StorageError::BucketNotFound(bucket) => {
                (ErrorCode::STORAGE_NOT_FOUND, Some(bucket.clone()))
            }
            StorageError::ObjectNotFound { bucket, .. } => {
                (ErrorCode::STORAGE_NOT_FOUND, Some(bucket.clone()))
            }
            StorageError::Unavailable(_) => (ErrorCode::STORAGE_BACKEND_ERROR, None),
            StorageError::Backend(_) => (ErrorCode::STORAGE_BACKEND_ERROR, None),
        };

        EtlError::storage_with_code(code, err.to_string(), bucket).with_source(err)
    }
}
