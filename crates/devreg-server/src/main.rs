//! Devreg Server - Main entry point

use anyhow::Result;
use devreg_common::logging::{init_logging, LogConfig, LogFormat, LogOutput};
use devreg_ingest::{IngestPipeline, PgDeviceStore};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

use devreg_server::{api, config::Config, db, features::FeatureState};

#[tokio::main]
async fn main() -> Result<()> {
    // JSON to console and a daily log file unless LOG_* says otherwise
    let log_config = LogConfig::builder()
        .output(LogOutput::Both)
        .format(LogFormat::Json)
        .log_file_prefix("devreg-server")
        .filter_directives("devreg_server=debug,devreg_ingest=info,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Devreg Server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        chunk_size = config.ingest.chunk_size,
        ingest_workers = config.ingest.worker_count,
        "Configuration loaded"
    );

    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    let store = Arc::new(PgDeviceStore::new(db_pool.clone()));
    let state = FeatureState {
        db: db_pool.clone(),
        pipeline: IngestPipeline::new(store, config.ingest)?,
        max_upload_bytes: config.server.max_upload_bytes,
    };

    let app = api::create_router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    db_pool.close().await;
    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
