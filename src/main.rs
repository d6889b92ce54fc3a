//! RegSweep — stale-instance reconciliation agent.
//!
//! Main entry point that loads configuration, wires the store and API
//! clients into the reconciliation jobs, and drives them on the cron
//! scheduler until shutdown.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use sweeper_client::{HttpRegistryClient, KubeEndpointDiscovery};
use sweeper_core::config::AppConfig;
use sweeper_core::error::AppError;
use sweeper_core::traits::{EndpointDiscovery, InstanceStore, RegistryApi, ServiceCatalog};
use sweeper_database::{DatabasePool, InstanceRepository};
use sweeper_worker::jobs::{CrashReconciler, EmptyServiceReaper, SoftDeleteReaper, UnhealthyReaper};
use sweeper_worker::{CronScheduler, JobRegistry};

#[tokio::main]
async fn main() {
    let env = std::env::var("REGSWEEP_ENV").unwrap_or_else(|_| "default".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Agent error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main agent run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        cluster = %config.cluster.identity,
        "Starting RegSweep"
    );

    let db_pool = DatabasePool::connect(&config.database).await?;
    if !db_pool.health_check().await? {
        return Err(AppError::database("Database health check failed at startup"));
    }
    let store = Arc::new(InstanceRepository::new(db_pool.pool().clone()));

    let registry_client = Arc::new(HttpRegistryClient::new(&config.registry)?);
    let discovery = Arc::new(KubeEndpointDiscovery::new(&config.platform)?);

    // The job registry is built here and handed to the scheduler; jobs with
    // missing required settings fail construction and abort startup.
    let mut jobs = JobRegistry::new();

    if config.jobs.soft_delete.enabled {
        jobs.register(Arc::new(SoftDeleteReaper::new(
            Arc::clone(&store) as Arc<dyn InstanceStore>,
            config.jobs.soft_delete.clone(),
        )));
    }

    if config.jobs.unhealthy.enabled {
        jobs.register(Arc::new(UnhealthyReaper::new(
            Arc::clone(&store) as Arc<dyn InstanceStore>,
            Arc::clone(&registry_client) as Arc<dyn RegistryApi>,
            config.jobs.unhealthy.clone(),
        )));
    }

    if config.jobs.empty_service.enabled {
        jobs.register(Arc::new(EmptyServiceReaper::new(
            Arc::clone(&registry_client) as Arc<dyn ServiceCatalog>,
            config.jobs.empty_service.clone(),
        )));
    }

    if config.jobs.crash.enabled {
        jobs.register(Arc::new(CrashReconciler::new(
            Arc::clone(&registry_client) as Arc<dyn RegistryApi>,
            Arc::clone(&discovery) as Arc<dyn EndpointDiscovery>,
            config.cluster.clone(),
            config.jobs.crash.clone(),
        )?));
    }

    if jobs.is_empty() {
        tracing::warn!("No jobs enabled, nothing to schedule");
    }

    let mut scheduler = CronScheduler::new().await?;
    scheduler.register_all(&jobs).await?;
    scheduler.start().await?;

    tracing::info!(jobs = jobs.len(), "RegSweep running, waiting for shutdown signal");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {e}")))?;

    tracing::info!("Shutdown signal received, stopping scheduler");

    // Ticks already in flight run to completion; only new firings stop.
    scheduler.shutdown().await?;
    jobs.teardown_all().await;
    db_pool.close().await;

    tracing::info!("RegSweep stopped");
    Ok(())
}
