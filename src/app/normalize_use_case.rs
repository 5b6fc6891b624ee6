use crate::app::ports::{CatalogPort, ObjectStorePort};
use crate::config::NormalizerConfig;
use crate::error::{EtlError, Result};
use crate::pipeline::processing::coerce::parse_bronze_csv;
use crate::pipeline::processing::project::{
    filter_positive_loans, project_accounts, project_customers, project_facts,
};
use crate::pipeline::tables;
use crate::sink::ColumnSpec;
use crate::types::{RunContext, RunStatus, TriggerEvent};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Bronze → silver component. Reads the raw CSV objects, coerces and filters
/// them, derives the payment labels, and writes the dimension and fact
/// tables as appended Parquet fragments, registering each with the catalog.
///
/// A run is all-or-nothing up to the first write: coercion failures abort
/// before any silver data exists. Failures between writes leave the earlier
/// tables in place; there is no rollback.
pub struct Normalizer {
    config: NormalizerConfig,
    store: Arc<dyn ObjectStorePort>,
    catalog: Arc<dyn CatalogPort>,
}

impl Normalizer {
    pub fn new(
        config: NormalizerConfig,
        store: Arc<dyn ObjectStorePort>,
        catalog: Arc<dyn CatalogPort>,
    ) -> Self {
        Self {
            config,
            store,
            catalog,
        }
    }

    pub async fn run(&self, _event: &TriggerEvent, ctx: &RunContext) -> Result<RunStatus> {
        info!(run_id = %ctx.run_id, bronze_prefix = %self.config.bronze_prefix, "starting bronze → silver run");

        let keys = self.store.list(&self.config.bronze_prefix).await?;
        let csv_keys: Vec<String> = keys.into_iter().filter(|k| k.ends_with(".csv")).collect();
        if csv_keys.is_empty() {
            return Err(EtlError::NotFound(format!(
                "no CSV objects under '{}'",
                self.config.bronze_prefix
            )));
        }

        let mut rows = Vec::new();
        for key in &csv_keys {
            let bytes = self.store.get(key).await?;
            rows.extend(parse_bronze_csv(&bytes)?);
        }
        let parsed = rows.len();

        let (rows, dropped) = filter_positive_loans(rows);
        info!(parsed, retained = rows.len(), dropped, "filtered non-positive loan amounts");

        let customers = project_customers(&rows);
        let accounts = project_accounts(&rows);
        let facts = project_facts(&rows);

        self.write_table(
            tables::DIM_CUSTOMER,
            tables::customers_to_batch(&customers)?,
            tables::CUSTOMER_COLUMNS,
        )
        .await?;
        self.write_table(
            tables::DIM_ACCOUNT,
            tables::accounts_to_batch(&accounts)?,
            tables::ACCOUNT_COLUMNS,
        )
        .await?;
        self.write_table(
            tables::FACT_LOAN_PAYMENT,
            tables::facts_to_batch(&facts)?,
            tables::FACT_COLUMNS,
        )
        .await?;

        Ok(RunStatus::success("Bronze → Silver ETL completed."))
    }

    /// Write one table as a fresh dataset fragment and register it.
    async fn write_table(
        &self,
        table: &str,
        batch: RecordBatch,
        columns: &[ColumnSpec],
    ) -> Result<()> {
        let rows = batch.num_rows();
        let bytes = tables::write_parquet(&batch)?;

        let location = format!("{}{}/", self.config.silver_prefix, table);
        let key = format!("{location}part-{}.parquet", Uuid::new_v4());
        self.store.put(&key, bytes).await?;

        self.catalog
            .register_table(&self.config.catalog_database, table, &location, columns)
            .await?;

        info!(table, rows, key, "silver fragment written and registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::in_memory::{InMemoryObjectStore, RecordingCatalog};

    const HEADER: &str = "Customer_ID,Name,Region,Contact_Number,Email,Customer_Score,Risk_Level,Account_Number,Account_Type,Loan_Type,Loan_Amount,Outstanding_Amount,EMI_Amount,Due_Date,Payment_Status,Last_Payment_Date,Payment_Delay_Days";

    fn config() -> NormalizerConfig {
        NormalizerConfig {
            bucket: "loan-data".to_string(),
            bronze_prefix: "bronze/".to_string(),
            silver_prefix: "silver/".to_string(),
            catalog_database: "loan_analytics".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_bronze_prefix_is_not_found() {
        let store = Arc::new(InMemoryObjectStore::new());
        let catalog = Arc::new(RecordingCatalog::new());
        let normalizer = Normalizer::new(config(), store, catalog);

        let err = normalizer
            .run(&TriggerEvent::default(), &RunContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::NotFound(_)));
    }

    #[tokio::test]
    async fn coercion_failure_writes_nothing() {
        let store = Arc::new(InMemoryObjectStore::new());
        let catalog = Arc::new(RecordingCatalog::new());
        let csv = format!(
            "{HEADER}\nC1,Asha,South,555,asha@example.com,700,Low,A1,Savings,Personal,oops,0,0,2025-02-01,Paid,2025-01-28,0\n"
        );
        store.insert("bronze/loans.csv", csv.into_bytes());

        let normalizer = Normalizer::new(config(), store.clone(), catalog.clone());
        let err = normalizer
            .run(&TriggerEvent::default(), &RunContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::TypeCoercion { .. }));
        assert!(store.keys_with_prefix("silver/").is_empty());
        assert!(catalog.registrations().is_empty());
    }

    #[tokio::test]
    async fn writes_three_registered_tables() {
        let store = Arc::new(InMemoryObjectStore::new());
        let catalog = Arc::new(RecordingCatalog::new());
        let csv = format!(
            "{HEADER}\nC1,Asha,South,555,asha@example.com,700,Low,A1,Savings,Personal,1000,500,100,2025-02-01,Paid,2025-01-28,0\n"
        );
        store.insert("bronze/loans.csv", csv.into_bytes());

        let normalizer = Normalizer::new(config(), store.clone(), catalog.clone());
        let status = normalizer
            .run(&TriggerEvent::default(), &RunContext::new())
            .await
            .unwrap();

        assert_eq!(status.status, "Success");
        assert_eq!(store.keys_with_prefix("silver/dim_customer/").len(), 1);
        assert_eq!(store.keys_with_prefix("silver/dim_account/").len(), 1);
        assert_eq!(store.keys_with_prefix("silver/fact_loan_payment/").len(), 1);

        let registrations = catalog.registrations();
        assert_eq!(registrations.len(), 3);
        assert!(registrations.iter().all(|r| r.database == "loan_analytics"));
    }
}
