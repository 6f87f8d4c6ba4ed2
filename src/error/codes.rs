/// Error code registry for ncload
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 3000-3999: Object storage errors
/// - 4000-4999: Extraction and subprocess errors
/// - 5000-5999: Staging errors
/// - 6000-6999: Warehouse errors
/// - 7000-7999: Sync errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_JSON: u16 = 1003;
    pub const CONFIG_VALIDATION_FAILED: u16 = 1008;

    // Storage errors (3000-3999)
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_NOT_FOUND: u16 = 3004;
    pub const STORAGE_BACKEND_ERROR: u16 = 3010;

    // Extraction errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_TIMEOUT: u16 = 4002;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4003;
    pub const EXTRACT_OUTPUT_INVALID: u16 = 4010;

    // Staging errors (5000-5999)
    pub const STAGE_CSV_WRITE: u16 = 5001;
    pub const STAGE_OUTPUT_COUNT: u16 = 5002;
    pub const STAGE_UPLOAD_FAILED: u16 = 5003;

    // Warehouse errors (6000-6999)
    pub const WAREHOUSE_CONNECT_FAILED: u16 = 6001;
    pub const WAREHOUSE_COPY_FAILED: u16 = 6002;
    pub const WAREHOUSE_UNKNOWN_FEATURE: u16 = 6003;
    pub const WAREHOUSE_CLOSE_FAILED: u16 = 6004;

    // Sync errors (7000-7999)
    pub const SYNC_LISTING_FAILED: u16 = 7001;
    pub const SYNC_COPY_FAILED: u16 = 7002;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_JSON => "Configuration file is not valid JSON",
        ErrorCode::CONFIG_VALIDATION_FAILED => "Configuration validation failed",

        ErrorCode::STORAGE_IO_ERROR => "Local file I/O failed",
        ErrorCode::STORAGE_NOT_FOUND => "Bucket or object not found",
        ErrorCode::STORAGE_BACKEND_ERROR => "Object storage backend error",

        ErrorCode::EXEC_GENERIC => "General extraction error",
        ErrorCode::EXEC_COMMAND_NOT_FOUND => "Extraction tool not found",
        ErrorCode::EXEC_TIMEOUT => "Extraction tool timed out",
        ErrorCode::EXEC_SUBPROCESS_FAILED => "Extraction tool exited with an error",
        ErrorCode::EXTRACT_OUTPUT_INVALID => "Extraction output could not be parsed",

        ErrorCode::STAGE_CSV_WRITE => "Failed to write staging CSV",
        ErrorCode::STAGE_OUTPUT_COUNT => "Expected exactly one staging CSV",
        ErrorCode::STAGE_UPLOAD_FAILED => "Failed to upload staging CSV",

        ErrorCode::WAREHOUSE_CONNECT_FAILED => "Could not connect to the warehouse",
        ErrorCode::WAREHOUSE_COPY_FAILED => "Bulk COPY statement failed",
        ErrorCode::WAREHOUSE_UNKNOWN_FEATURE => "Feature has no destination table",
        ErrorCode::WAREHOUSE_CLOSE_FAILED => "Failed to close the warehouse connection",

        ErrorCode::SYNC_LISTING_FAILED => "Failed to list bucket contents",
        ErrorCode::SYNC_COPY_FAILED => "Failed to copy object between buckets",

        _ => "Unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_have_descriptions() {
        for code in [
            ErrorCode::CONFIG_NOT_FOUND,
            ErrorCode::STORAGE_NOT_FOUND,
            ErrorCode::EXEC_TIMEOUT,
            ErrorCode::STAGE_OUTPUT_COUNT,
            ErrorCode::WAREHOUSE_COPY_FAILED,
            ErrorCode::WAREHOUSE_CLOSE_FAILED,
            ErrorCode::SYNC_COPY_FAILED,
        ] {
            assert_ne!(describe_error_code(code), "Unknown error");
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(describe_error_code(1), "Unknown error");
    }
}
