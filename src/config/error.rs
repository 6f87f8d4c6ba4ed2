use crate::error::{ErrorCode, EtlError};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Convert ConfigError to EtlError
impl From<ConfigError> for EtlError {
    fn from(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::NotFound { .. } => ErrorCode::CONFIG_NOT_FOUND,
            ConfigError::Read { .. } => ErrorCode::CONFIG_GENERIC,
            ConfigError::Parse { .. } => ErrorCode::CONFIG_INVALID_JSON,
            ConfigError::Invalid { .. } => ErrorCode::CONFIG_VALIDATION_FAILED,
        };

        EtlError::config_with_code(code, err.to_string()).with_source(err)
    }
}
