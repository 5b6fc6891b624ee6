//! In-memory implementations of the ports, for tests and local development.

use crate::app::ports::{
    BulkLoaderPort, CatalogPort, DbCredentials, ObjectStorePort, SecretStorePort,
};
use crate::error::{EtlError, Result};
use crate::sink::ColumnSpec;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Object store over a sorted map, so listings come back in lexicographic
/// key order like a real bucket listing.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing the port.
    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
    }

    pub fn get_sync(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ObjectStorePort for InMemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| EtlError::NotFound(format!("object '{key}'")))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        debug!(key, size = bytes.len(), "stored object");
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.keys_with_prefix(prefix))
    }
}

/// One recorded catalog registration.
#[derive(Debug, Clone)]
pub struct TableRegistration {
    pub database: String,
    pub table: String,
    pub location: String,
    pub columns: Vec<ColumnSpec>,
}

/// Catalog that remembers every registration it receives.
#[derive(Default)]
pub struct RecordingCatalog {
    registrations: Arc<Mutex<Vec<TableRegistration>>>,
}

impl RecordingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> Vec<TableRegistration> {
        self.registrations.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogPort for RecordingCatalog {
    async fn register_table(
        &self,
        database: &str,
        table: &str,
        location: &str,
        columns: &[ColumnSpec],
    ) -> Result<()> {
        self.registrations.lock().unwrap().push(TableRegistration {
            database: database.to_string(),
            table: table.to_string(),
            location: location.to_string(),
            columns: columns.to_vec(),
        });
        Ok(())
    }
}

/// Secret store holding a single named credential pair.
pub struct StaticSecretStore {
    name: String,
    credentials: DbCredentials,
}

impl StaticSecretStore {
    pub fn new(name: &str, username: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            credentials: DbCredentials {
                username: username.to_string(),
                password: password.to_string(),
            },
        }
    }
}

#[async_trait]
impl SecretStorePort for StaticSecretStore {
    async fn get_secret(&self, name: &str) -> Result<DbCredentials> {
        if name == self.name {
            Ok(self.credentials.clone())
        } else {
            Err(EtlError::SecretRetrieval(format!("unknown secret '{name}'")))
        }
    }
}

/// One recorded bulk load.
#[derive(Debug, Clone)]
pub struct RecordedLoad {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
    pub payload: Vec<u8>,
    pub rows: usize,
}

/// Bulk loader that records each load instead of touching a database.
#[derive(Default)]
pub struct RecordingBulkLoader {
    loads: Arc<Mutex<Vec<RecordedLoad>>>,
}

impl RecordingBulkLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loads(&self) -> Vec<RecordedLoad> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BulkLoaderPort for RecordingBulkLoader {
    async fn load(&self, table: &str, columns: &[ColumnSpec], csv_payload: &[u8]) -> Result<u64> {
        let rows = csv_payload
            .split(|b| *b == b'\n')
            .filter(|line| !line.is_empty())
            .count();
        self.loads.lock().unwrap().push(RecordedLoad {
            table: table.to_string(),
            columns: columns.to_vec(),
            payload: csv_payload.to_vec(),
            rows,
        });
        Ok(rows as u64)
    }
}
