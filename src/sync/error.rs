use crate::config::ConfigError;
use crate::error::{ErrorCode, EtlError};
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to list bucket {bucket}: {source}")]
    Listing {
        bucket: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to copy {key} ({} file(s) already copied): {source}", .copied.len())]
    Copy {
        key: String,
        /// Keys copied before the failure; they stay in the destination
        copied: Vec<String>,
        #[source]
        source: StorageError,
    },
}

/// Convert SyncError to EtlError
impl From<SyncError> for EtlError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Config(e) => e.into(),
            SyncError::Listing { .. } => {
                EtlError::sync_with_code(ErrorCode::SYNC_LISTING_FAILED, err.to_string())
                    .with_source(err)
            }
            SyncError::Copy { .. } => {
                EtlError::sync_with_code(ErrorCode::SYNC_COPY_FAILED, err.to_string())
                    .with_source(err)
            }
        }
    }
}
