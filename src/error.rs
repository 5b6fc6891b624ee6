use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("missing required configuration: {0}")]
    MissingConfiguration(String),

    #[error("type coercion failed for column '{column}': cannot parse {value:?}")]
    TypeCoercion { column: String, value: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage write failed: {0}")]
    StorageWrite(String),

    #[error("catalog registration failed: {0}")]
    CatalogRegistration(String),

    #[error("secret retrieval failed: {0}")]
    SecretRetrieval(String),

    #[error("database connection failed: {0}")]
    DatabaseConnection(String),

    #[error("bulk load failed: {0}")]
    BulkLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
