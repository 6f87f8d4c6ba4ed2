//! Bulk-copy statement

use super::error::WarehouseError;
use crate::config::{Secret, Variables};
use crate::storage::{s3_uri, staged_key};
use std::time::Duration;

/// `COPY <schema>.<table> FROM 's3://<bucket>/<key>' ... CSV IGNOREHEADER 1`
#[derive(Debug, Clone, PartialEq)]
pub struct CopyStatement {
    pub schema: String,
    pub table: String,
    pub bucket: String,
    pub key: String,
    access_key: String,
    secret_access_key: Secret,
}

impl CopyStatement {
    /// Statement loading the staged extract of `feature` into its table
    pub fn for_feature(variables: &Variables, feature: &str) -> Result<Self, WarehouseError> {
        let table = variables
            .table_for(feature)
            .ok_or_else(|| WarehouseError::UnknownFeature(feature.to_string()))?;

        Ok(Self {
            schema: variables.etl.jdbc.schema.clone(),
            table: table.to_string(),
            bucket: variables.etl.temps3dir.clone(),
            key: staged_key(feature),
            access_key: variables.access.access_key.clone(),
            secret_access_key: variables.access.secret_access_key.clone(),
        })
    }

    /// `schema.table`
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    pub fn source_uri(&self) -> String {
        s3_uri(&self.bucket, &self.key)
    }

    /// SQL text sent to the warehouse
    pub fn to_sql(&self) -> String {
        self.render(self.secret_access_key.expose())
    }

    /// SQL text with the secret key masked, safe for logs
    pub fn redacted(&self) -> String {
        self.render("***")
    }

    fn render(&self, secret: &str) -> String {
        format!(
            "COPY {} FROM '{}' CREDENTIALS 'aws_access_key_id={};aws_secret_access_key={}' CSV IGNOREHEADER 1",
            self.qualified_table(),
            escape_literal(&self.source_uri()),
            escape_literal(&self.access_key),
            escape_literal(secret),
        )
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Where and how to connect, taken from `etl.jdbc`
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Secret,
    pub timeout: Duration,
}

impl From<&Variables> for ConnectParams {
    fn from(variables: &Variables) -> Self {
        let jdbc = &variables.etl.jdbc;
        Self {
            host: jdbc.url.clone(),
            port: jdbc.port,
            database: jdbc.db.clone(),
            user: jdbc.user_name.clone(),
            password: jdbc.password.clone(),
            timeout: jdbc.connect_timeout,
        }
    }
}
