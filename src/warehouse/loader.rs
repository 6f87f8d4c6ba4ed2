//! Loads a staged feature file into its warehouse table

use super::error::WarehouseError;
use super::statement::{ConnectParams, CopyStatement};
use super::traits::Warehouse;
use crate::config::{CleanupPolicy, Variables};
use crate::storage::ObjectStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of a successful load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    pub feature: String,
    /// `schema.table`
    pub table: String,
    pub rows: u64,
    pub staged_deleted: bool,
}

pub struct WarehouseLoader {
    warehouse: Arc<dyn Warehouse>,
    store: Arc<dyn ObjectStore>,
}

impl WarehouseLoader {
    pub fn new(warehouse: Arc<dyn Warehouse>, store: Arc<dyn ObjectStore>) -> Self {
        Self { warehouse, store }
    }

    /// COPY `{temps3dir}/{feature}.csv` into `schema.dbtable[feature]`
    pub async fn load(
        &self,
        variables: &Variables,
        feature: &str,
    ) -> Result<LoadOutcome, WarehouseError> {
        let statement = CopyStatement::for_feature(variables, feature)?;
        let table = statement.qualified_table();

        let result = self.copy(variables, &statement).await;

        let delete = match (&result, variables.etl.jdbc.cleanup) {
            (Ok(_), _) | (Err(_), CleanupPolicy::Always) => true,
            (Err(_), CleanupPolicy::OnSuccess) => false,
        };
        let staged_deleted = if delete {
            self.delete_staged(&statement).await
        } else {
            warn!(
                "Keeping {} for a later retry of {}",
                statement.source_uri(),
                table
            );
            false
        };

        let rows = result?;
        info!("Loaded {} row(s) of {} into {}", rows, feature, table);
        Ok(LoadOutcome {
            feature: feature.to_string(),
            table,
            rows,
            staged_deleted,
        })
    }

    async fn copy(
        &self,
        variables: &Variables,
        statement: &CopyStatement,
    ) -> Result<u64, WarehouseError> {
        let params = ConnectParams::from(variables);
        let mut session = self.warehouse.connect(&params).await.map_err(|e| {
            error!("{}", e);
            e
        })?;

        debug!("Executing {}", statement.redacted());
        let result = session.copy(statement).await;
        if let Err(e) = &result {
            error!("{}", e);
        }

        if let Err(e) = session.close().await {
            warn!("Closing warehouse connection failed: {}", e);
        }
        result
    }

    async fn delete_staged(&self, statement: &CopyStatement) -> bool {
        match self
            .store
            .delete_object(&statement.bucket, &statement.key)
            .await
        {
            Ok(()) => {
                debug!("Deleted {}", statement.source_uri());
                true
            }
            Err(e) => {
                warn!("Could not delete {}: {}", statement.source_uri(), e);
                false
            }
        }
    }
}
