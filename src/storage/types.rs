//! Helpers for object keys

/// Suffix of the data files the pipeline moves around
pub const NETCDF_SUFFIX: &str = ".nc";

/// Suffix of staged extracts
pub const CSV_SUFFIX: &str = ".csv";

/// Whether a key names a NetCDF file
pub fn is_netcdf(key: &str) -> bool {
    key.ends_with(NETCDF_SUFFIX)
}

/// Key a feature's extract is staged under
pub fn staged_key(feature: &str) -> String {
    format!("{feature}{CSV_SUFFIX}")
}

/// `s3://bucket/key` form used by warehouse COPY statements
pub fn s3_uri(bucket: &str, key: &str) -> String {
    format!("s3://{}/{}", bucket.trim_end_matches('/'), key)
}

/// Last path segment of a key, used for local file names
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
