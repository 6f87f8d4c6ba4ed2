use crate::error::{ErrorCode, EtlError};

#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("Feature '{0}' has no destination table in etl.jdbc.dbtable")]
    UnknownFeature(String),

    #[error("Unable to connect to {host}:{port}: {message}")]
    Connect {
        host: String,
        port: u16,
        message: String,
    },

    #[error("COPY into {table} failed: {message}")]
    Copy { table: String, message: String },

    #[error("Closing the connection to {host} failed: {message}")]
    Close { host: String, message: String },
}

impl WarehouseError {
    pub fn connect(host: &str, port: u16, message: impl std::fmt::Display) -> Self {
        Self::Connect {
            host: host.to_string(),
            port,
            message: message.to_string(),
        }
    }

    pub fn close(host: &str, message: impl std::fmt::Display) -> Self {
        Self::Close {
            host: host.to_string(),
            message: message.to_string(),
        }
    }

    pub fn copy(table: &str, message: impl std::fmt::Display) -> Self {
        Self::Copy {
            table: table.to_string(),
            message: message.to_string(),
        }
    }
}

/// Convert WarehouseError to EtlError
impl From<WarehouseError> for EtlError {
    fn from(err: WarehouseError) -> Self {
        let (code, feature) = match &err {
            WarehouseError::UnknownFeature(feature) => {
                (ErrorCode::WAREHOUSE_UNKNOWN_FEATURE, Some(feature.clone()))
            }
            WarehouseError::Connect { .. } => (ErrorCode::WAREHOUSE_CONNECT_FAILED, None),
            WarehouseError::Copy { .. } => (ErrorCode::WAREHOUSE_COPY_FAILED, None),
            WarehouseError::Close { .. } => (ErrorCode::WAREHOUSE_CLOSE_FAILED, None),
        };

        EtlError::warehouse_with_code(code, err.to_string(), feature).with_source(err)
    }
}
