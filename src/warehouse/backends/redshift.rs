//! Redshift (PostgreSQL wire protocol) warehouse

use super::super::error::WarehouseError;
use super::super::statement::{ConnectParams, CopyStatement};
use super::super::traits::{Warehouse, WarehouseSession};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection, Executor};
use tracing::{debug, info};

/// Connects with `sqlx` and runs COPY inside an explicit transaction
#[derive(Debug, Default, Clone, Copy)]
pub struct RedshiftWarehouse;

impl RedshiftWarehouse {
    pub fn new() -> Self {
        Self
    }

    fn connect_options(params: &ConnectParams) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .database(&params.database)
            .username(&params.user)
            .password(params.password.expose())
            .application_name("ncload")
            // COPY text carries credentials
            .disable_statement_logging()
    }
}

#[async_trait]
impl Warehouse for RedshiftWarehouse {
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn WarehouseSession>, WarehouseError> {
        debug!(
            "Connecting to {}:{}/{} as {}",
            params.host, params.port, params.database, params.user
        );

        let options = Self::connect_options(params);
        let conn = match tokio::time::timeout(params.timeout, options.connect()).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(WarehouseError::connect(&params.host, params.port, e)),
            Err(_) => {
                return Err(WarehouseError::connect(
                    &params.host,
                    params.port,
                    format!("timed out after {:?}", params.timeout),
                ))
            }
        };

        info!("Connected to warehouse at {}:{}", params.host, params.port);
        Ok(Box::new(RedshiftSession {
            conn,
            host: params.host.clone(),
        }))
    }
}

struct RedshiftSession {
    conn: PgConnection,
    host: String,
}

#[async_trait]
impl WarehouseSession for RedshiftSession {
    async fn copy(&mut self, statement: &CopyStatement) -> Result<u64, WarehouseError> {
        let table = statement.qualified_table();
        let copy_error = |e: sqlx::Error| WarehouseError::copy(&table, e);

        let mut tx = self.conn.begin().await.map_err(copy_error)?;
        let sql = statement.to_sql();
        let conn: &mut PgConnection = &mut tx;
        let result = conn
            .execute(sqlx::raw_sql(&sql))
            .await
            .map_err(copy_error)?;
        tx.commit().await.map_err(copy_error)?;

        Ok(result.rows_affected())
    }

    async fn close(self: Box<Self>) -> Result<(), WarehouseError> {
        let host = self.host;
        self.conn
            .close()
            .await
            .map_err(|e| WarehouseError::close(&host, e))
    }
}
