//! Ports for the external collaborators the pipeline depends on. Cloud
//! plumbing lives behind these traits; the use cases only see the traits.

use crate::error::Result;
use crate::sink::ColumnSpec;
use async_trait::async_trait;
use serde::Deserialize;

/// Object storage holding all three data-lake layers. Keys are
/// bucket-relative paths; listing is recursive under the given prefix.
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// External table catalog, updated whenever a silver table is written.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    async fn register_table(
        &self,
        database: &str,
        table: &str,
        location: &str,
        columns: &[ColumnSpec],
    ) -> Result<()>;
}

/// Database credentials as stored in the secret payload.
#[derive(Debug, Clone, Deserialize)]
pub struct DbCredentials {
    pub username: String,
    pub password: String,
}

/// Named-secret lookup for the relational sink's credentials.
#[async_trait]
pub trait SecretStorePort: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<DbCredentials>;
}

/// Bulk-load capability of the relational sink: create the table if absent
/// from the pinned column specs, then copy the staged CSV rows in one atomic
/// call. Returns the number of rows loaded.
#[async_trait]
pub trait BulkLoaderPort: Send + Sync {
    async fn load(&self, table: &str, columns: &[ColumnSpec], csv_payload: &[u8]) -> Result<u64>;
}
