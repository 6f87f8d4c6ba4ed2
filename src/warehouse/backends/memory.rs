//! In-memory warehouse backed by a [`MemoryObjectStore`]

use super::super::error::WarehouseError;
use super::super::statement::{ConnectParams, CopyStatement};
use super::super::traits::{Warehouse, WarehouseSession};
use crate::features::Table;
use crate::storage::{MemoryObjectStore, ObjectStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, Vec<Vec<String>>>,
    statements: Vec<String>,
    unreachable: bool,
    failing_copy: Option<String>,
    failing_close: bool,
    connections: usize,
    closed: usize,
}

/// Resolves COPY statements against objects in a [`MemoryObjectStore`]
#[derive(Debug, Clone)]
pub struct MemoryWarehouse {
    store: MemoryObjectStore,
    state: Arc<RwLock<State>>,
}

impl MemoryWarehouse {
    pub fn new(store: MemoryObjectStore) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Refuse every connection attempt
    pub async fn set_unreachable(&self) {
        self.state.write().await.unreachable = true;
    }

    /// Fail every COPY with `message`
    pub async fn fail_copies(&self, message: impl Into<String>) {
        self.state.write().await.failing_copy = Some(message.into());
    }

    /// Fail every close after counting it
    pub async fn fail_closes(&self) {
        self.state.write().await.failing_close = true;
    }

    /// Rows loaded into `schema.table`
    pub async fn rows(&self, qualified_table: &str) -> Vec<Vec<String>> {
        self.state
            .read()
            .await
            .tables
            .get(qualified_table)
            .cloned()
            .unwrap_or_default()
    }

    /// Redacted text of every COPY received
    pub async fn statements(&self) -> Vec<String> {
        self.state.read().await.statements.clone()
    }

    /// (opened, closed) connection counts
    pub async fn connection_counts(&self) -> (usize, usize) {
        let state = self.state.read().await;
        (state.connections, state.closed)
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn WarehouseSession>, WarehouseError> {
        let mut state = self.state.write().await;
        if state.unreachable {
            return Err(WarehouseError::connect(
                &params.host,
                params.port,
                "connection refused",
            ));
        }
        state.connections += 1;

        Ok(Box::new(MemorySession {
            warehouse: self.clone(),
            host: params.host.clone(),
        }))
    }
}

struct MemorySession {
    warehouse: MemoryWarehouse,
    host: String,
}

#[async_trait]
impl WarehouseSession for MemorySession {
    async fn copy(&mut self, statement: &CopyStatement) -> Result<u64, WarehouseError> {
        let table = statement.qualified_table();
        self.warehouse
            .state
            .write()
            .await
            .statements
            .push(statement.redacted());

        if let Some(message) = self.warehouse.state.read().await.failing_copy.clone() {
            return Err(WarehouseError::copy(&table, message));
        }

        let bytes = self
            .warehouse
            .store
            .get_bytes(&statement.bucket, &statement.key)
            .await
            .map_err(|e| WarehouseError::copy(&table, e))?;
        let text = String::from_utf8(bytes).map_err(|e| WarehouseError::copy(&table, e))?;
        let parsed = Table::from_csv(&text).map_err(|e| WarehouseError::copy(&table, e))?;

        let loaded = parsed.len() as u64;
        self.warehouse
            .state
            .write()
            .await
            .tables
            .entry(table)
            .or_default()
            .extend(parsed.rows().iter().cloned());

        Ok(loaded)
    }

    async fn close(self: Box<Self>) -> Result<(), WarehouseError> {
        let mut state = self.warehouse.state.write().await;
        state.closed += 1;
        if state.failing_close {
            return Err(WarehouseError::close(&self.host, "connection reset"));
        }
        Ok(())
    }
}
