//! Warehouse backends

pub mod memory;
#[cfg(feature = "postgres")]
pub mod redshift;

pub use memory::MemoryWarehouse;
#[cfg(feature = "postgres")]
pub use redshift::RedshiftWarehouse;
