//! Filesystem-backed adapters for local runs: object keys map to paths
//! under a root directory, and catalog registrations become JSON manifests.

use crate::app::ports::{CatalogPort, DbCredentials, ObjectStorePort, SecretStorePort};
use crate::error::{EtlError, Result};
use crate::sink::ColumnSpec;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Object store rooted at a local directory. Keys are slash-separated paths
/// relative to the root.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collect_keys(&self, dir: &Path, keys: &mut Vec<String>) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.collect_keys(&path, keys)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                keys.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorePort for FsObjectStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.root.join(key);
        fs::read(&path).map_err(|_| EtlError::NotFound(format!("object '{key}'")))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| EtlError::StorageWrite(format!("{}: {e}", parent.display())))?;
        }
        fs::write(&path, bytes).map_err(|e| EtlError::StorageWrite(format!("{key}: {e}")))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        self.collect_keys(&self.root, &mut keys)?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}

#[derive(Serialize)]
struct TableManifest<'a> {
    database: &'a str,
    table: &'a str,
    location: &'a str,
    columns: Vec<ManifestColumn<'a>>,
    registered_at: String,
}

#[derive(Serialize)]
struct ManifestColumn<'a> {
    name: &'a str,
    sql_type: &'static str,
}

/// Catalog writing one JSON manifest per registered table under
/// `{root}/{database}/{table}.json`.
pub struct FsCatalog {
    root: PathBuf,
}

impl FsCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl CatalogPort for FsCatalog {
    async fn register_table(
        &self,
        database: &str,
        table: &str,
        location: &str,
        columns: &[ColumnSpec],
    ) -> Result<()> {
        let manifest = TableManifest {
            database,
            table,
            location,
            columns: columns
                .iter()
                .map(|c| ManifestColumn {
                    name: c.name,
                    sql_type: c.sql_type.ddl(),
                })
                .collect(),
            registered_at: Utc::now().to_rfc3339(),
        };

        let dir = self.root.join(database);
        fs::create_dir_all(&dir)
            .map_err(|e| EtlError::CatalogRegistration(format!("{database}/{table}: {e}")))?;
        let payload = serde_json::to_vec_pretty(&manifest)?;
        fs::write(dir.join(format!("{table}.json")), payload)
            .map_err(|e| EtlError::CatalogRegistration(format!("{database}/{table}: {e}")))
    }
}

/// Secret store reading a JSON credential payload from the environment
/// variable named by the secret.
pub struct EnvSecretStore;

#[async_trait]
impl SecretStorePort for EnvSecretStore {
    async fn get_secret(&self, name: &str) -> Result<DbCredentials> {
        let payload = std::env::var(name)
            .map_err(|_| EtlError::SecretRetrieval(format!("secret '{name}' not set")))?;
        serde_json::from_str(&payload)
            .map_err(|e| EtlError::SecretRetrieval(format!("secret '{name}': {e}")))
    }
}
