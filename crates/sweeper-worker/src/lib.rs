//! # sweeper-worker
//!
//! The reconciliation engine: the [`CleanupJob`] contract, the explicit
//! [`JobRegistry`], the [`CronScheduler`] that fires registered jobs on
//! their own cadences, and the four job implementations (soft-delete
//! reaper, unhealthy-instance reaper, empty-service reaper, crash
//! reconciler).

pub mod batch;
pub mod job;
pub mod jobs;
pub mod paging;
pub mod registry;
pub mod scheduler;

pub use job::{CleanupJob, JobError};
pub use registry::JobRegistry;
pub use scheduler::CronScheduler;
