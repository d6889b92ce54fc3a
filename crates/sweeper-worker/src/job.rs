//! The periodic job contract.

use async_trait::async_trait;
use serde_json::Value;

use sweeper_core::error::AppError;
use sweeper_core::result::AppResult;

/// A unit of periodic reconciliation work.
///
/// The scheduler is agnostic to what a job does: it only needs a schedule,
/// an action to fire on each tick, and a name for diagnostics. Each job
/// exclusively owns whatever state it accumulates across ticks.
#[async_trait]
pub trait CleanupJob: Send + Sync + std::fmt::Debug {
    /// Human-readable job name for logs.
    fn name(&self) -> &str;

    /// Six-field cron schedule (seconds optional) this job fires on.
    fn cron_spec(&self) -> &str;

    /// Execute one tick. Returns a JSON report of what the tick did.
    async fn run(&self) -> Result<Value, JobError>;

    /// Release any resources held by the job at shutdown.
    async fn teardown(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Error from a single job tick.
///
/// No variant crashes the process; the scheduler logs the outcome and the
/// job is retried on its next scheduled firing.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The candidate query matched nothing. Surfaced to the caller as a
    /// distinct outcome, not a hard failure.
    #[error("no instances matched the candidate query")]
    NothingToDo,

    /// An external call failed before any deletion was issued; the tick
    /// aborted without mutating state.
    #[error("tick aborted: {0}")]
    Transient(#[source] AppError),

    /// A batch delete failed partway through. Batches submitted before the
    /// failure are not rolled back; later batches were never attempted.
    #[error(
        "batch {failed_batch} of {total_batches} failed ({completed} batches already submitted): {source}"
    )]
    Batch {
        /// One-based index of the failing batch.
        failed_batch: usize,
        /// Total batches the tick planned to submit.
        total_batches: usize,
        /// Batches successfully submitted before the failure.
        completed: usize,
        /// The underlying delete error.
        #[source]
        source: AppError,
    },
}

impl JobError {
    /// Whether this outcome is the benign "nothing to do" case.
    pub fn is_nothing_to_do(&self) -> bool {
        matches!(self, Self::NothingToDo)
    }
}
