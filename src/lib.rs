//! # ncload
//!
//! Moves new NetCDF data files from a source bucket into a raw-data bucket,
//! extracts one table per configured feature, stages each table as CSV in
//! object storage and bulk-loads it into a Redshift table.
//!
//! ## Usage
//!
//! ```bash
//! ncload [-v] run [--variables variables.json] [--lenient-listing] [--format text|json]
//! ncload diff [--variables variables.json]
//! ncload validate [--variables variables.json]
//! ```
//!
//! ## Modules
//!
//! - `config` - `variables.json` loading and validation
//! - `error` - Unified error type with numeric error codes
//! - `features` - Feature extraction through an external tool
//! - `pipeline` - Run driver and run report
//! - `scratch` - Run-scoped local working directory
//! - `stage` - CSV staging into object storage
//! - `storage` - Object storage abstraction (S3, in-memory)
//! - `subprocess` - Subprocess abstraction layer for testing
//! - `sync` - Source to raw-data bucket differ
//! - `warehouse` - Bulk `COPY` loading into the warehouse
//! - `testing` - Testing utilities and fixtures
pub mod config;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod scratch;
pub mod stage;
pub mod storage;
pub mod subprocess;
pub mod sync;
pub mod warehouse;

pub mod testing;

pub use error::{EtlError, Result};
