use super::table::TableError;
use crate::config::ConfigError;
use crate::error::{ErrorCode, EtlError};
use crate::storage::StorageError;
use crate::subprocess::ProcessError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Extraction tool failed for '{feature}': {source}")]
    Process {
        feature: String,
        #[source]
        source: ProcessError,
    },

    #[error("Extraction tool exited with {status} for '{feature}': {stderr}")]
    ToolFailed {
        feature: String,
        status: String,
        stderr: String,
    },

    #[error("Unreadable output for '{feature}': {source}")]
    Output {
        feature: String,
        #[source]
        source: TableError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub fn feature(&self) -> Option<&str> {
        match self {
            Self::Process { feature, .. }
            | Self::ToolFailed { feature, .. }
            | Self::Output { feature, .. } => Some(feature),
            _ => None,
        }
    }
}

/// Convert ExtractError to EtlError
impl From<ExtractError> for EtlError {
    fn from(err: ExtractError) -> Self {
        let code = match &err {
            ExtractError::Config(_) => ErrorCode::CONFIG_GENERIC,
            ExtractError::Fetch { .. } => ErrorCode::STORAGE_NOT_FOUND,
            ExtractError::Process {
                source: ProcessError::CommandNotFound(_),
                ..
            } => ErrorCode::EXEC_COMMAND_NOT_FOUND,
            ExtractError::Process {
                source: ProcessError::Timeout(_),
                ..
            } => ErrorCode::EXEC_TIMEOUT,
            ExtractError::Process { .. } => ErrorCode::EXEC_GENERIC,
            ExtractError::ToolFailed { .. } => ErrorCode::EXEC_SUBPROCESS_FAILED,
            ExtractError::Output { .. } => ErrorCode::EXTRACT_OUTPUT_INVALID,
            ExtractError::Io(_) => ErrorCode::STORAGE_IO_ERROR,
        };
        let feature = err.feature().map(str::to_string);

        EtlError::extraction_with_code(code, err.to_string(), feature).with_source(err)
    }
}
