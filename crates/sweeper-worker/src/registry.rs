//! Explicit job registry.
//!
//! Constructed by the bootstrap layer and handed to the scheduler; there is
//! no ambient global job map.

use std::sync::Arc;

use tracing::{info, warn};

use crate::job::CleanupJob;

/// The set of jobs to schedule, owned for their registered lifetime.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Vec<Arc<dyn CleanupJob>>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job. Jobs fire independently of each other.
    pub fn register(&mut self, job: Arc<dyn CleanupJob>) {
        info!(job = job.name(), cron = job.cron_spec(), "Registered job");
        self.jobs.push(job);
    }

    /// All registered jobs.
    pub fn jobs(&self) -> &[Arc<dyn CleanupJob>] {
        &self.jobs
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no jobs are registered.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Tear down every registered job. Failures are logged, not propagated,
    /// so one job cannot block shutdown of the others.
    pub async fn teardown_all(&self) {
        for job in &self.jobs {
            if let Err(e) = job.teardown().await {
                warn!(job = job.name(), error = %e, "Job teardown failed");
            }
        }
    }
}
