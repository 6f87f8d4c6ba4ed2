//! Warehouse traits

use super::error::WarehouseError;
use super::statement::{ConnectParams, CopyStatement};
use async_trait::async_trait;

/// Something that hands out warehouse sessions
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Open one session; a single attempt, no retries
    async fn connect(&self, params: &ConnectParams)
        -> Result<Box<dyn WarehouseSession>, WarehouseError>;
}

/// An open warehouse connection
#[async_trait]
pub trait WarehouseSession: Send {
    /// Run the COPY and commit it, returning the number of rows loaded
    async fn copy(&mut self, statement: &CopyStatement) -> Result<u64, WarehouseError>;

    /// Close the connection
    async fn close(self: Box<Self>) -> Result<(), WarehouseError>;
}
