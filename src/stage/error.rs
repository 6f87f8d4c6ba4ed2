use crate::config::ConfigError;
use crate::error::{ErrorCode, EtlError};
use crate::features::TableError;
use crate::storage::StorageError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write CSV for '{feature}': {source}")]
    Write {
        feature: String,
        #[source]
        source: TableError,
    },

    #[error("Expected exactly one CSV file in {}, found {found}", .dir.display())]
    OutputCount { dir: PathBuf, found: usize },

    #[error("Failed to upload {key} to {bucket}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert StageError to EtlError
impl From<StageError> for EtlError {
    fn from(err: StageError) -> Self {
        let (code, feature) = match &err {
            StageError::Config(_) => (ErrorCode::CONFIG_GENERIC, None),
            StageError::Write { feature, .. } => (ErrorCode::STAGE_CSV_WRITE, Some(feature.clone())),
            StageError::OutputCount { .. } => (ErrorCode::STAGE_OUTPUT_COUNT, None),
            StageError::Upload { .. } => (ErrorCode::STAGE_UPLOAD_FAILED, None),
            StageError::Io(_) => (ErrorCode::STORAGE_IO_ERROR, None),
        };

        EtlError::staging_with_code(code, err.to_string(), feature).with_source(err)
    }
}
