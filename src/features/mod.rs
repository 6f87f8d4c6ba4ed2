//! Feature extraction
//!
//! Turns one data file into one table per configured feature. Decoding the
//! file format is left to an external tool; see [`CommandExtractor`].

pub mod command;
pub mod error;
pub mod table;


pub use command::CommandExtractor;
pub use error::ExtractError;
pub use table::{FeatureTable, Table, TableError};

use async_trait::async_trait;

#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    /// Extract every configured feature from the data file stored under `key`
    /// in the raw-data bucket
    async fn extract(&self, key: &str) -> Result<Vec<FeatureTable>, ExtractError>;
}
