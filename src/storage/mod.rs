//! Object storage layer
//!
//! The pipeline talks to buckets only through [`ObjectStore`]. Production runs
//! use [`S3ObjectStore`]; tests and dry runs use [`MemoryObjectStore`].

pub mod backends;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use backends::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use backends::S3ObjectStore;
pub use error::{StorageError, StorageResult};
pub use traits::ObjectStore;
pub use types::{is_netcdf, s3_uri, staged_key, CSV_SUFFIX, NETCDF_SUFFIX};
