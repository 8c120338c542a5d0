//! Devreg Ingest - bulk load a device CSV into Postgres

use anyhow::{Context, Result};
use clap::Parser;
use devreg_common::logging::{init_logging, LogConfig, LogLevel};
use devreg_ingest::{IngestPipeline, PgDeviceStore, PipelineConfig};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "devreg-ingest")]
#[command(author, version, about = "Bulk device ingestion tool")]
struct Cli {
    /// CSV file to ingest (name,type,brand,model,os,os_version,purchase_date,warranty_end,status,price)
    file: PathBuf,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Devices per bulk insert
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Number of concurrent writers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Run pending migrations before ingesting
    #[arg(long)]
    migrate: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("devreg-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let mut config = PipelineConfig::from_env()?;
    if let Some(chunk_size) = cli.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }
    if let Some(workers) = cli.workers {
        config = config.with_worker_count(workers);
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.worker_count as u32 + 1)
        .connect(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    if cli.migrate {
        info!("Running database migrations");
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    let file = tokio::fs::File::open(&cli.file)
        .await
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;

    let pipeline = IngestPipeline::new(Arc::new(PgDeviceStore::new(pool.clone())), config)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after queued lines are written");
            ctrl_c.cancel();
        }
    });

    info!(file = %cli.file.display(), "Ingesting devices");
    let result = pipeline.run_with_cancel(file, cancel).await;

    pool.close().await;

    if result.is_complete() {
        info!(
            accepted = result.accepted_count,
            rejected = result.rejected_count,
            persisted = result.persisted_count,
            "Ingestion complete"
        );
    } else {
        error!(
            failed_batches = result.failed_batch_count,
            read_fault = ?result.read_fault,
            cancelled = result.cancelled,
            persisted = result.persisted_count,
            "Ingestion finished with errors"
        );
    }

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
