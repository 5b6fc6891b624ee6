//! Local runner for the two batch components, wired over the filesystem
//! adapters. Stands in for the external trigger during development.

use clap::{Parser, Subcommand};
use loan_lakehouse::app::aggregate_use_case::Aggregator;
use loan_lakehouse::app::normalize_use_case::Normalizer;
use loan_lakehouse::config::{AggregatorConfig, NormalizerConfig};
use loan_lakehouse::logging;
use loan_lakehouse::sink::postgres::PostgresBulkLoader;
use loan_lakehouse::storage::fs::{EnvSecretStore, FsCatalog, FsObjectStore};
use loan_lakehouse::types::{RunContext, RunStatus, TriggerEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "run-pipeline")]
#[command(about = "Loan lakehouse ETL local runner")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory standing in for the object-storage bucket
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bronze → silver normalizer
    Normalize,
    /// Run the silver → gold aggregator
    Aggregate,
    /// Run both stages sequentially
    Run,
}

async fn normalize(data_dir: &PathBuf) -> anyhow::Result<RunStatus> {
    let config = NormalizerConfig::from_env()?;
    let store = Arc::new(FsObjectStore::new(data_dir.join(&config.bucket)));
    let catalog = Arc::new(FsCatalog::new(data_dir.join("catalog")));
    let normalizer = Normalizer::new(config, store, catalog);
    Ok(normalizer.run(&TriggerEvent::default(), &RunContext::new()).await?)
}

async fn aggregate(data_dir: &PathBuf) -> anyhow::Result<RunStatus> {
    let config = AggregatorConfig::from_env()?;
    let store = Arc::new(FsObjectStore::new(data_dir.join(&config.bucket)));
    let loader = Arc::new(PostgresBulkLoader::new(&config, Arc::new(EnvSecretStore)));
    let aggregator = Aggregator::new(config, store, loader);
    Ok(aggregator.run(&TriggerEvent::default(), &RunContext::new()).await?)
}

fn report(status: &RunStatus) {
    println!("✅ {}: {}", status.status, status.message);
    if let Some(count) = status.record_count {
        println!("   Records: {count}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Normalize => normalize(&cli.data_dir).await.map(|s| vec![s]),
        Commands::Aggregate => aggregate(&cli.data_dir).await.map(|s| vec![s]),
        Commands::Run => {
            let first = normalize(&cli.data_dir).await?;
            let second = aggregate(&cli.data_dir).await?;
            Ok(vec![first, second])
        }
    };

    match result {
        Ok(statuses) => {
            for status in &statuses {
                report(status);
            }
            Ok(())
        }
        Err(e) => {
            error!("run failed: {e}");
            Err(e)
        }
    }
}
