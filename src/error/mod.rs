use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for the whole pipeline
///
/// Every subsystem keeps its own error enum and converts into this one at the
/// pipeline boundary, attaching a numeric code from [`ErrorCode`].
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        bucket: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Extraction error: {message}")]
    Extraction {
        code: u16,
        message: String,
        feature: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Staging error: {message}")]
    Staging {
        code: u16,
        message: String,
        feature: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Warehouse error: {message}")]
    Warehouse {
        code: u16,
        message: String,
        feature: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Sync error: {message}")]
    Sync {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl EtlError {
    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error with specific code and bucket
    pub fn storage_with_code(
        code: u16,
        message: impl Into<String>,
        bucket: Option<String>,
    ) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            bucket,
            source: None,
        }
    }

    /// Create an extraction error with specific code
    pub fn extraction_with_code(
        code: u16,
        message: impl Into<String>,
        feature: Option<String>,
    ) -> Self {
        Self::Extraction {
            code,
            message: message.into(),
            feature,
            source: None,
        }
    }

    /// Create a staging error with specific code
    pub fn staging_with_code(code: u16, message: impl Into<String>, feature: Option<String>) -> Self {
        Self::Staging {
            code,
            message: message.into(),
            feature,
            source: None,
        }
    }

    /// Create a warehouse error with specific code
    pub fn warehouse_with_code(
        code: u16,
        message: impl Into<String>,
        feature: Option<String>,
    ) -> Self {
        Self::Warehouse {
            code,
            message: message.into(),
            feature,
            source: None,
        }
    }

    /// Create a sync error with specific code
    pub fn sync_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Sync {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, err: impl Into<BoxedSource>) -> Self {
        let boxed = Some(err.into());
        match &mut self {
            Self::Config { source, .. }
            | Self::Storage { source, .. }
            | Self::Extraction { source, .. }
            | Self::Staging { source, .. }
            | Self::Warehouse { source, .. }
            | Self::Sync { source, .. } => *source = boxed,
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Storage { code, .. }
            | Self::Extraction { code, .. }
            | Self::Staging { code, .. }
            | Self::Warehouse { code, .. }
            | Self::Sync { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration error: {}", message),
            Self::Storage {
                message, bucket, ..
            } => match bucket {
                Some(b) => format!("Storage error in bucket '{}': {}", b, message),
                None => format!("Storage error: {}", message),
            },
            Self::Extraction {
                message, feature, ..
            }
            | Self::Staging {
                message, feature, ..
            }
            | Self::Warehouse {
                message, feature, ..
            } => match feature {
                Some(f) => format!("Feature '{}': {}", f, message),
                None => message.clone(),
            },
            Self::Sync { message, .. } => format!("Sync failed: {}", message),
        }
    }
}

impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::storage_with_code(ErrorCode::STORAGE_IO_ERROR, err.to_string(), None)
            .with_source(err)
    }
}

/// Type alias for Results using EtlError
pub type Result<T> = std::result::Result<T, EtlError>;
