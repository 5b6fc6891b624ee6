use crate::error::{EtlError, Result};
use std::env;

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| EtlError::MissingConfiguration(key.to_string()))
}

fn optional(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Settings for the bronze → silver normalization run.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Object-storage bucket holding all three layers
    pub bucket: String,
    /// Prefix the raw CSV objects live under
    pub bronze_prefix: String,
    /// Prefix the normalized tables are written under
    pub silver_prefix: String,
    /// Catalog database the silver tables are registered in
    pub catalog_database: String,
}

impl NormalizerConfig {
    /// Load from environment variables, failing fast if a required key is
    /// absent. No I/O happens before this succeeds.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bucket: required("BUCKET_NAME")?,
            bronze_prefix: required("BRONZE_PREFIX")?,
            silver_prefix: optional("SILVER_PREFIX", "silver/"),
            catalog_database: optional("CATALOG_DATABASE", "loan_analytics"),
        })
    }
}

/// Settings for the silver → gold aggregation run.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub bucket: String,
    pub silver_prefix: String,
    /// Prefix the summary artifact is written under
    pub gold_prefix: String,
    /// Name of the secret holding the database credentials
    pub secret_name: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    /// Relational table the region summary is bulk-loaded into
    pub summary_table: String,
}

impl AggregatorConfig {
    pub fn from_env() -> Result<Self> {
        let db_port = optional("DB_PORT", "5432")
            .parse::<u16>()
            .map_err(|_| EtlError::MissingConfiguration("DB_PORT must be a port number".to_string()))?;

        Ok(Self {
            bucket: required("BUCKET_NAME")?,
            silver_prefix: optional("SILVER_PREFIX", "silver/"),
            gold_prefix: optional("GOLD_PREFIX", "gold/"),
            secret_name: required("DB_SECRET_NAME")?,
            db_host: required("DB_HOST")?,
            db_port,
            db_name: optional("DB_NAME", "appdb"),
            summary_table: optional("SUMMARY_TABLE", "region_summary"),
        })
    }
}
