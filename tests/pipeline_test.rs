//! End-to-end runs of both components over the in-memory adapters.

use anyhow::Result;
use loan_lakehouse::app::aggregate_use_case::Aggregator;
use loan_lakehouse::app::normalize_use_case::Normalizer;
use loan_lakehouse::config::{AggregatorConfig, NormalizerConfig};
use loan_lakehouse::error::EtlError;
use loan_lakehouse::pipeline::tables;
use loan_lakehouse::storage::in_memory::{
    InMemoryObjectStore, RecordingBulkLoader, RecordingCatalog,
};
use loan_lakehouse::types::{RunContext, TriggerEvent};
use std::sync::Arc;

const HEADER: &str = "Customer_ID,Name,Region,Contact_Number,Email,Customer_Score,Risk_Level,Account_Number,Account_Type,Loan_Type,Loan_Amount,Outstanding_Amount,EMI_Amount,Due_Date,Payment_Status,Last_Payment_Date,Payment_Delay_Days";

fn bronze_row(customer_id: &str, region: &str, account: &str, loan_amount: f64, delay: i64) -> String {
    format!(
        "{customer_id},Customer {customer_id},{region},555-0100,{customer_id}@example.com,700,Low,{account},Savings,Personal,{loan_amount},{outstanding},100,2025-02-01,Paid,2025-01-28,{delay}",
        outstanding = loan_amount / 2.0
    )
}

fn bronze_csv(rows: &[String]) -> Vec<u8> {
    format!("{HEADER}\n{}\n", rows.join("\n")).into_bytes()
}

fn normalizer_config() -> NormalizerConfig {
    NormalizerConfig {
        bucket: "loan-data".to_string(),
        bronze_prefix: "bronze/".to_string(),
        silver_prefix: "silver/".to_string(),
        catalog_database: "loan_analytics".to_string(),
    }
}

fn aggregator_config() -> AggregatorConfig {
    AggregatorConfig {
        bucket: "loan-data".to_string(),
        silver_prefix: "silver/".to_string(),
        gold_prefix: "gold/".to_string(),
        secret_name: "loan-db".to_string(),
        db_host: "localhost".to_string(),
        db_port: 5432,
        db_name: "appdb".to_string(),
        summary_table: "region_summary".to_string(),
    }
}

async fn run_normalizer(store: Arc<InMemoryObjectStore>) -> Result<(), EtlError> {
    let catalog = Arc::new(RecordingCatalog::new());
    let normalizer = Normalizer::new(normalizer_config(), store, catalog);
    normalizer
        .run(&TriggerEvent::default(), &RunContext::new())
        .await
        .map(|_| ())
}

fn read_facts(store: &InMemoryObjectStore) -> Vec<loan_lakehouse::types::LoanPaymentFactRow> {
    let fragments: Vec<Vec<u8>> = store
        .keys_with_prefix("silver/fact_loan_payment/")
        .iter()
        .map(|k| store.get_sync(k).unwrap())
        .collect();
    tables::facts_from_parquet(&fragments).unwrap()
}

// Scenario 1: three rows, one filtered out, behaviors Good and Delayed.
#[tokio::test]
async fn normalizer_filters_and_labels() -> Result<()> {
    let store = Arc::new(InMemoryObjectStore::new());
    store.insert(
        "bronze/loans.csv",
        bronze_csv(&[
            bronze_row("C1", "North", "A1", 100.0, 0),
            bronze_row("C2", "North", "A2", 0.0, 5),
            bronze_row("C3", "South", "A3", 200.0, 15),
        ]),
    );

    run_normalizer(store.clone()).await?;

    let facts = read_facts(&store);
    assert_eq!(facts.len(), 2);

    let behaviors: Vec<&str> = facts.iter().map(|f| f.payment_behavior.as_str()).collect();
    assert_eq!(behaviors, vec!["Good", "Delayed"]);
    assert_eq!(facts[0].payment_on_time_flag, "Yes");
    assert_eq!(facts[1].payment_on_time_flag, "No");

    // the filtered customer never reaches any silver table
    let customer_fragments: Vec<Vec<u8>> = store
        .keys_with_prefix("silver/dim_customer/")
        .iter()
        .map(|k| store.get_sync(k).unwrap())
        .collect();
    let customers = tables::customers_from_parquet(&customer_fragments)?;
    assert!(customers.iter().all(|c| c.customer_id != "C2"));
    Ok(())
}

// Duplicate keys in the input collapse to one dimension row each.
#[tokio::test]
async fn dimensions_are_deduplicated() -> Result<()> {
    let store = Arc::new(InMemoryObjectStore::new());
    store.insert(
        "bronze/loans.csv",
        bronze_csv(&[
            bronze_row("C1", "North", "A1", 100.0, 0),
            bronze_row("C1", "North", "A1", 150.0, 3),
            bronze_row("C1", "North", "A2", 75.0, 1),
        ]),
    );

    run_normalizer(store.clone()).await?;

    let customer_fragments: Vec<Vec<u8>> = store
        .keys_with_prefix("silver/dim_customer/")
        .iter()
        .map(|k| store.get_sync(k).unwrap())
        .collect();
    let customers = tables::customers_from_parquet(&customer_fragments)?;
    assert_eq!(customers.len(), 1);

    // the fact table keeps every retained row
    assert_eq!(read_facts(&store).len(), 3);
    Ok(())
}

// Scenario 2: empty silver prefix → NotFound, no gold artifact, no DB load.
#[tokio::test]
async fn aggregator_fails_on_empty_silver() {
    let store = Arc::new(InMemoryObjectStore::new());
    let loader = Arc::new(RecordingBulkLoader::new());
    let aggregator = Aggregator::new(aggregator_config(), store.clone(), loader.clone());

    let err = aggregator
        .run(&TriggerEvent::default(), &RunContext::new())
        .await
        .unwrap_err();

    assert!(matches!(err, EtlError::NotFound(_)));
    assert!(store.keys_with_prefix("gold/").is_empty());
    assert!(loader.loads().is_empty());
}

// Scenario 3: two North facts with amounts 100 and 200 → one North summary
// row with total_loan_amount 300, flowing bronze → silver → gold → sink.
#[tokio::test]
async fn full_pipeline_aggregates_by_region() -> Result<()> {
    let store = Arc::new(InMemoryObjectStore::new());
    store.insert(
        "bronze/loans.csv",
        bronze_csv(&[
            bronze_row("C1", "North", "A1", 100.0, 2),
            bronze_row("C2", "North", "A2", 200.0, 4),
        ]),
    );

    run_normalizer(store.clone()).await?;

    let loader = Arc::new(RecordingBulkLoader::new());
    let aggregator = Aggregator::new(aggregator_config(), store.clone(), loader.clone());
    let status = aggregator
        .run(&TriggerEvent::default(), &RunContext::new())
        .await?;

    assert_eq!(status.status, "Success");
    assert_eq!(status.record_count, Some(1));

    let gold = store.get_sync("gold/region_summary/data.parquet").unwrap();
    let summary = tables::summary_from_parquet(&[gold])?;
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].region.as_deref(), Some("North"));
    assert_eq!(summary[0].total_loan_amount, 300.0);
    assert_eq!(summary[0].total_outstanding_amount, 150.0);
    assert_eq!(summary[0].total_emi_amount, 200.0);
    assert_eq!(summary[0].avg_payment_delay, 3.0);
    assert_eq!(summary[0].customer_count, 2);

    let loads = loader.loads();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].table, "region_summary");
    assert_eq!(
        String::from_utf8(loads[0].payload.clone()).unwrap(),
        "North,300,150,200,3,2\n"
    );
    Ok(())
}

// Summary row count tracks the number of distinct regions.
#[tokio::test]
async fn one_summary_row_per_region() -> Result<()> {
    let store = Arc::new(InMemoryObjectStore::new());
    store.insert(
        "bronze/loans.csv",
        bronze_csv(&[
            bronze_row("C1", "North", "A1", 10.0, 0),
            bronze_row("C2", "South", "A2", 20.0, 0),
            bronze_row("C3", "East", "A3", 30.0, 0),
            bronze_row("C4", "South", "A4", 40.0, 0),
        ]),
    );

    run_normalizer(store.clone()).await?;

    let loader = Arc::new(RecordingBulkLoader::new());
    let aggregator = Aggregator::new(aggregator_config(), store.clone(), loader.clone());
    let status = aggregator
        .run(&TriggerEvent::default(), &RunContext::new())
        .await?;

    assert_eq!(status.record_count, Some(3));
    Ok(())
}
