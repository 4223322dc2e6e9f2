use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use campus_repair_api::app;
use campus_repair_api::config::Config;
use campus_repair_api::jobs::{
    ExpiredSessionsJob, JobScheduler, PoolMetricsJob, PurgeCompletedRequestsJob,
};
use campus_repair_api::middleware::{init_logging, init_metrics};
use campus_repair_api::services::storage::{ImageStorage, LocalImageStorage};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging);
    init_metrics()?;

    info!("Starting Campus Repair API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let storage: Arc<dyn ImageStorage> =
        Arc::new(LocalImageStorage::new(config.storage.media_root.clone()));

    let mut scheduler = JobScheduler::new();
    scheduler.register(PurgeCompletedRequestsJob::new(
        pool.clone(),
        storage,
        config.limits.completed_request_retention_days,
    ));
    scheduler.register(ExpiredSessionsJob::new(pool.clone()));
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    scheduler.start();

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool)?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Server stopped");

    Ok(())
}
