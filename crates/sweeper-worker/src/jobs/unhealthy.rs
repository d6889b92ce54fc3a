//! Unhealthy-instance reaper — removes instances whose health heartbeat has
//! lapsed, through the registry's management API rather than the store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use sweeper_core::config::jobs::ReaperSettings;
use sweeper_core::traits::{InstanceStore, RegistryApi};
use sweeper_core::types::InstanceRef;

use crate::batch;
use crate::job::{CleanupJob, JobError};

/// Pause between consecutive delete batches.
const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Requests removal of heartbeat-expired instances in rate-limited batches.
///
/// Candidates come from the store, but removal goes through the registry's
/// management API so the registry can run its own bookkeeping.
#[derive(Debug)]
pub struct UnhealthyReaper {
    store: Arc<dyn InstanceStore>,
    registry: Arc<dyn RegistryApi>,
    settings: ReaperSettings,
    batch_pause: Duration,
}

impl UnhealthyReaper {
    /// Create a new unhealthy-instance reaper.
    pub fn new(
        store: Arc<dyn InstanceStore>,
        registry: Arc<dyn RegistryApi>,
        settings: ReaperSettings,
    ) -> Self {
        Self {
            store,
            registry,
            settings,
            batch_pause: BATCH_PAUSE,
        }
    }

    /// Override the inter-batch pause.
    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }
}

#[async_trait]
impl CleanupJob for UnhealthyReaper {
    fn name(&self) -> &str {
        "unhealthy_reaper"
    }

    fn cron_spec(&self) -> &str {
        &self.settings.cron
    }

    async fn run(&self) -> Result<Value, JobError> {
        let candidates = self
            .store
            .find_unhealthy(self.settings.max_age_minutes, self.settings.max_rows)
            .await
            .map_err(JobError::Transient)?;

        // Distinct outcome, surfaced to the caller rather than silently
        // succeeding.
        if candidates.is_empty() {
            return Err(JobError::NothingToDo);
        }

        info!(
            candidates = candidates.len(),
            "Requesting removal of unhealthy instances"
        );

        let batch_size = match self.settings.batch_size {
            0 => batch::DEFAULT_BATCH_SIZE,
            size => size,
        };
        let total_batches = candidates.len().div_ceil(batch_size);
        let mut deleted = 0usize;

        for (index, chunk) in batch::split(&candidates, batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.batch_pause).await;
            }

            let refs: Vec<InstanceRef> = chunk
                .iter()
                .map(|id| InstanceRef { id: id.clone() })
                .collect();

            if let Err(e) = self.registry.delete_instances(&refs).await {
                // Prior batches stand; nothing is rolled back.
                return Err(JobError::Batch {
                    failed_batch: index + 1,
                    total_batches,
                    completed: index,
                    source: e,
                });
            }
            deleted += chunk.len();
        }

        Ok(serde_json::json!({
            "candidates": candidates.len(),
            "deleted": deleted,
            "batches": total_batches,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use sweeper_core::error::AppError;
    use sweeper_core::result::AppResult;
    use sweeper_core::types::InstancePage;

    #[derive(Debug, Default)]
    struct StubStore {
        unhealthy: Vec<String>,
    }

    #[async_trait]
    impl InstanceStore for StubStore {
        async fn find_soft_deleted(&self, _max_age_minutes: u32, _limit: u32) -> AppResult<Vec<String>> {
            Ok(vec![])
        }

        async fn find_unhealthy(&self, _max_age_minutes: u32, limit: u32) -> AppResult<Vec<String>> {
            Ok(self.unhealthy.iter().take(limit as usize).cloned().collect())
        }

        async fn purge(&self, _ids: &[String]) -> AppResult<u64> {
            unreachable!("unhealthy reaper never purges directly")
        }
    }

    #[derive(Debug, Default)]
    struct RecordingRegistry {
        delete_calls: Mutex<Vec<Vec<InstanceRef>>>,
        attempts: Mutex<usize>,
        fail_at_attempt: Option<usize>,
    }

    #[async_trait]
    impl RegistryApi for RecordingRegistry {
        async fn list_instances(
            &self,
            _service: &str,
            _namespace: &str,
            _offset: usize,
            _limit: usize,
        ) -> AppResult<InstancePage> {
            unreachable!("unhealthy reaper never lists")
        }

        async fn delete_instances(&self, instances: &[InstanceRef]) -> AppResult<()> {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            if self.fail_at_attempt == Some(*attempts) {
                return Err(AppError::external("registry refused delete"));
            }
            self.delete_calls.lock().unwrap().push(instances.to_vec());
            Ok(())
        }
    }

    fn settings(batch_size: usize) -> ReaperSettings {
        ReaperSettings {
            enabled: true,
            cron: "0 0 2 * * *".to_string(),
            max_age_minutes: 60,
            max_rows: 10_000,
            batch_size,
        }
    }

    fn reaper(
        store: Arc<StubStore>,
        registry: Arc<RecordingRegistry>,
        batch_size: usize,
    ) -> UnhealthyReaper {
        UnhealthyReaper::new(store, registry, settings(batch_size))
            .with_batch_pause(Duration::ZERO)
    }

    #[tokio::test]
    async fn zero_candidates_is_surfaced_as_nothing_to_do() {
        let store = Arc::new(StubStore::default());
        let registry = Arc::new(RecordingRegistry::default());

        let err = reaper(store, Arc::clone(&registry), 100)
            .run()
            .await
            .expect_err("surfaced");
        assert!(err.is_nothing_to_do());
        assert_eq!(*registry.attempts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn deletes_in_ceil_m_over_b_ordered_batches() {
        let store = Arc::new(StubStore {
            unhealthy: (0..250).map(|i| format!("ins-{i}")).collect(),
        });
        let registry = Arc::new(RecordingRegistry::default());

        let report = reaper(store, Arc::clone(&registry), 100)
            .run()
            .await
            .expect("tick");

        let calls = registry.delete_calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].len(), 100);
        assert_eq!(calls[2].len(), 50);
        assert_eq!(calls[0][0].id, "ins-0");
        assert_eq!(calls[1][0].id, "ins-100");
        assert_eq!(report["deleted"], 250);
    }

    #[tokio::test]
    async fn first_batch_failure_stops_the_tick() {
        let store = Arc::new(StubStore {
            unhealthy: (0..300).map(|i| format!("ins-{i}")).collect(),
        });
        let registry = Arc::new(RecordingRegistry {
            fail_at_attempt: Some(2),
            ..Default::default()
        });

        let err = reaper(store, Arc::clone(&registry), 100)
            .run()
            .await
            .expect_err("tick fails");
        match err {
            JobError::Batch {
                failed_batch,
                completed,
                total_batches,
                ..
            } => {
                assert_eq!(failed_batch, 2);
                assert_eq!(completed, 1);
                assert_eq!(total_batches, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Batch 1 submitted, batch 2 refused, batch 3 never attempted.
        assert_eq!(*registry.attempts.lock().unwrap(), 2);
        assert_eq!(registry.delete_calls.lock().unwrap().len(), 1);
    }
}
