//! Cron scheduler for the reconciliation jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use sweeper_core::error::AppError;

use crate::job::{CleanupJob, JobError};
use crate::registry::JobRegistry;

/// Cron-based scheduler driving all registered jobs.
///
/// Different jobs fire concurrently with respect to each other, but a single
/// job's ticks never overlap: each job carries a tick guard, and a firing
/// that arrives while the previous tick is still running is skipped.
pub struct CronScheduler {
    /// The underlying timer engine.
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Register every job in the registry with the timer engine.
    ///
    /// A job with an invalid cron spec fails registration immediately with a
    /// validation error and is never retried.
    pub async fn register_all(&self, registry: &JobRegistry) -> Result<(), AppError> {
        for job in registry.jobs() {
            self.add_job(Arc::clone(job)).await?;
        }

        tracing::info!(jobs = registry.len(), "All jobs registered with scheduler");
        Ok(())
    }

    /// Start firing all registered timers.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Halt the timer engine. Ticks already in flight run to completion; no
    /// new ticks are fired.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Bind one job to a timer.
    async fn add_job(&self, job: Arc<dyn CleanupJob>) -> Result<(), AppError> {
        let name = job.name().to_string();
        let spec = job.cron_spec().to_string();

        // Serializes the job's own ticks without blocking the timer engine.
        let tick_guard = Arc::new(tokio::sync::Mutex::new(()));

        let cron_job = CronJob::new_async(spec.as_str(), move |_uuid, _lock| {
            let job = Arc::clone(&job);
            let tick_guard = Arc::clone(&tick_guard);
            Box::pin(async move {
                let _tick = match tick_guard.try_lock() {
                    Ok(tick) => tick,
                    Err(_) => {
                        tracing::warn!(
                            job = job.name(),
                            "Previous tick still running, skipping this firing"
                        );
                        return;
                    }
                };

                tracing::debug!(job = job.name(), "Tick started");
                match job.run().await {
                    Ok(report) => {
                        tracing::info!(job = job.name(), %report, "Tick completed");
                    }
                    Err(JobError::NothingToDo) => {
                        tracing::info!(job = job.name(), "Tick completed: nothing to do");
                    }
                    Err(e) => {
                        tracing::error!(
                            job = job.name(),
                            error = %e,
                            "Tick failed, will retry on next firing"
                        );
                    }
                }
            })
        })
        .map_err(|e| {
            AppError::validation(format!("Invalid cron spec '{spec}' for job '{name}': {e}"))
        })?;

        self.scheduler
            .add(cron_job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add job '{name}': {e}")))?;

        Ok(())
    }
}
