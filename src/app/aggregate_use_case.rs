use crate::app::ports::{BulkLoaderPort, ObjectStorePort};
use crate::config::AggregatorConfig;
use crate::error::{EtlError, Result};
use crate::pipeline::processing::aggregate::summarize_by_region;
use crate::pipeline::tables;
use crate::sink;
use crate::types::{RunContext, RunStatus, TriggerEvent};
use std::sync::Arc;
use tracing::info;

/// Silver → gold component. Reads the customer dimension and the fact table
/// back from the silver prefix, left-joins them on customer id, aggregates
/// per region, writes the gold Parquet artifact, and bulk-loads the same
/// rows into the relational summary table.
pub struct Aggregator {
    config: AggregatorConfig,
    store: Arc<dyn ObjectStorePort>,
    loader: Arc<dyn BulkLoaderPort>,
}

impl Aggregator {
    pub fn new(
        config: AggregatorConfig,
        store: Arc<dyn ObjectStorePort>,
        loader: Arc<dyn BulkLoaderPort>,
    ) -> Self {
        Self {
            config,
            store,
            loader,
        }
    }

    pub async fn run(&self, _event: &TriggerEvent, ctx: &RunContext) -> Result<RunStatus> {
        info!(run_id = %ctx.run_id, silver_prefix = %self.config.silver_prefix, "starting silver → gold run");

        let fact_fragments = self.read_fragments(tables::FACT_LOAN_PAYMENT).await?;
        let customer_fragments = self.read_fragments(tables::DIM_CUSTOMER).await?;

        let facts = tables::facts_from_parquet(&fact_fragments)?;
        let customers = tables::customers_from_parquet(&customer_fragments)?;

        let rollup = summarize_by_region(&facts, &customers);
        info!(
            facts = facts.len(),
            regions = rollup.rows.len(),
            unmatched = rollup.unmatched_facts,
            "aggregated facts by region"
        );

        let batch = tables::summary_to_batch(&rollup.rows)?;
        let bytes = tables::write_parquet(&batch)?;
        let gold_key = format!("{}{}/data.parquet", self.config.gold_prefix, tables::REGION_SUMMARY);
        self.store.put(&gold_key, bytes).await?;
        info!(key = %gold_key, "gold summary artifact written");

        let staged = sink::stage_csv(&rollup.rows)?;
        let loaded = self
            .loader
            .load(&self.config.summary_table, sink::SUMMARY_COLUMNS, &staged)
            .await?;
        info!(loaded, table = %self.config.summary_table, "region summary loaded into relational store");

        Ok(RunStatus::success(format!(
            "Aggregated region summary saved to gold layer and loaded into '{}'",
            self.config.summary_table
        ))
        .with_count(rollup.rows.len()))
    }

    /// Collect every Parquet fragment under the table's silver location.
    /// Zero fragments means the normalizer has not run for this table yet.
    async fn read_fragments(&self, table: &str) -> Result<Vec<Vec<u8>>> {
        let prefix = format!("{}{}/", self.config.silver_prefix, table);
        let keys = self.store.list(&prefix).await?;
        let parquet_keys: Vec<String> =
            keys.into_iter().filter(|k| k.ends_with(".parquet")).collect();
        if parquet_keys.is_empty() {
            return Err(EtlError::NotFound(format!(
                "no Parquet fragments under '{prefix}'"
            )));
        }

        let mut fragments = Vec::with_capacity(parquet_keys.len());
        for key in &parquet_keys {
            fragments.push(self.store.get(key).await?);
        }
        Ok(fragments)
    }
}
