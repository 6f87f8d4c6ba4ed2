//! Warehouse loader
//!
//! Bulk-loads a staged feature CSV into its destination table with a single
//! `COPY ... FROM 's3://...'` statement and cleans up the staged object.

pub mod backends;
pub mod error;
pub mod loader;
pub mod statement;
pub mod traits;


pub use backends::MemoryWarehouse;
#[cfg(feature = "postgres")]
pub use backends::RedshiftWarehouse;
pub use error::WarehouseError;
pub use loader::{LoadOutcome, WarehouseLoader};
pub use statement::{ConnectParams, CopyStatement};
pub use traits::{Warehouse, WarehouseSession};
