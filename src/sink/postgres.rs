use crate::app::ports::{BulkLoaderPort, SecretStorePort};
use crate::config::AggregatorConfig;
use crate::error::{EtlError, Result};
use crate::sink::{create_table_ddl, ColumnSpec};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::sync::Arc;
use tracing::info;

/// Postgres-backed bulk loader. Credentials come from the secret store at
/// load time; each load opens one connection, issues the create-if-absent
/// DDL, then streams the staged CSV through COPY. The COPY is a single
/// statement, so a mid-stream failure leaves no partial rows (the committed
/// DDL stays in place).
pub struct PostgresBulkLoader {
    host: String,
    port: u16,
    database: String,
    secret_name: String,
    secrets: Arc<dyn SecretStorePort>,
}

impl PostgresBulkLoader {
    pub fn new(config: &AggregatorConfig, secrets: Arc<dyn SecretStorePort>) -> Self {
        Self {
            host: config.db_host.clone(),
            port: config.db_port,
            database: config.db_name.clone(),
            secret_name: config.secret_name.clone(),
            secrets,
        }
    }

    async fn connect(&self) -> Result<PgConnection> {
        let credentials = self.secrets.get_secret(&self.secret_name).await?;
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&credentials.username)
            .password(&credentials.password);
        PgConnection::connect_with(&options)
            .await
            .map_err(|e| EtlError::DatabaseConnection(e.to_string()))
    }
}

#[async_trait]
impl BulkLoaderPort for PostgresBulkLoader {
    async fn load(&self, table: &str, columns: &[ColumnSpec], csv_payload: &[u8]) -> Result<u64> {
        let mut connection = self.connect().await?;

        let ddl = create_table_ddl(table, columns);
        sqlx::query(&ddl)
            .execute(&mut connection)
            .await
            .map_err(|e| EtlError::BulkLoad(format!("create table: {e}")))?;

        let column_list = columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ");
        let statement = format!("COPY {table} ({column_list}) FROM STDIN WITH (FORMAT CSV)");
        let mut copy = connection
            .copy_in_raw(&statement)
            .await
            .map_err(|e| EtlError::BulkLoad(e.to_string()))?;
        copy.send(csv_payload)
            .await
            .map_err(|e| EtlError::BulkLoad(e.to_string()))?;
        let loaded = copy
            .finish()
            .await
            .map_err(|e| EtlError::BulkLoad(e.to_string()))?;

        let _ = connection.close().await;
        info!(table, loaded, "bulk copy committed");
        Ok(loaded)
    }
}
