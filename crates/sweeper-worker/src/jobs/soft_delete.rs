//! Soft-delete reaper — purges logically-deleted records past their TTL
//! straight from the store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use sweeper_core::config::jobs::ReaperSettings;
use sweeper_core::traits::InstanceStore;

use crate::batch;
use crate::job::{CleanupJob, JobError};

/// Pause between consecutive delete batches.
const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Purges soft-deleted instance rows in rate-limited batches.
#[derive(Debug)]
pub struct SoftDeleteReaper {
    store: Arc<dyn InstanceStore>,
    settings: ReaperSettings,
    batch_pause: Duration,
}

impl SoftDeleteReaper {
    /// Create a new soft-delete reaper.
    pub fn new(store: Arc<dyn InstanceStore>, settings: ReaperSettings) -> Self {
        Self {
            store,
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
impl CleanupJob for SoftDeleteReaper {
    fn name(&self) -> &str {
        "soft_delete_reaper"
    }

    fn cron_spec(&self) -> &str {
        &self.settings.cron
    }

    async fn run(&self) -> Result<Value, JobError> {
        let candidates = self
            .store
            .find_soft_deleted(self.settings.max_age_minutes, self.settings.max_rows)
            .await
            .map_err(JobError::Transient)?;

        // An empty candidate set is a normal no-op.
        if candidates.is_empty() {
            return Ok(serde_json::json!({
                "candidates": 0,
                "purged": 0,
            }));
        }

        info!(candidates = candidates.len(), "Purging soft-deleted instances");

        let batch_size = match self.settings.batch_size {
            0 => batch::DEFAULT_BATCH_SIZE,
            size => size,
        };
        let total_batches = candidates.len().div_ceil(batch_size);
        let mut purged = 0u64;

        for (index, chunk) in batch::split(&candidates, batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.batch_pause).await;
            }

            match self.store.purge(chunk).await {
                Ok(rows) => purged += rows,
                Err(e) => {
                    // Prior batches stand; nothing is rolled back.
                    return Err(JobError::Batch {
                        failed_batch: index + 1,
                        total_batches,
                        completed: index,
                        source: e,
                    });
                }
            }
        }

        Ok(serde_json::json!({
            "candidates": candidates.len(),
            "purged": purged,
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

    #[derive(Debug, Default)]
    struct RecordingStore {
        soft_deleted: Vec<String>,
        purge_calls: Mutex<Vec<Vec<String>>>,
        fail_at_call: Option<usize>,
    }

    #[async_trait]
    impl InstanceStore for RecordingStore {
        async fn find_soft_deleted(
            &self,
            _max_age_minutes: u32,
            limit: u32,
        ) -> AppResult<Vec<String>> {
            Ok(self
                .soft_deleted
                .iter()
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn find_unhealthy(&self, _max_age_minutes: u32, _limit: u32) -> AppResult<Vec<String>> {
            Ok(vec![])
        }

        async fn purge(&self, ids: &[String]) -> AppResult<u64> {
            let mut calls = self.purge_calls.lock().unwrap();
            if self.fail_at_call == Some(calls.len() + 1) {
                return Err(AppError::database("deadlock detected"));
            }
            calls.push(ids.to_vec());
            Ok(ids.len() as u64)
        }
    }

    fn settings(batch_size: usize) -> ReaperSettings {
        ReaperSettings {
            enabled: true,
            cron: "0 0 1 * * *".to_string(),
            max_age_minutes: 1440,
            max_rows: 10_000,
            batch_size,
        }
    }

    fn reaper(store: Arc<RecordingStore>, batch_size: usize) -> SoftDeleteReaper {
        SoftDeleteReaper::new(store, settings(batch_size)).with_batch_pause(Duration::ZERO)
    }

    #[tokio::test]
    async fn empty_candidate_set_is_a_no_op() {
        let store = Arc::new(RecordingStore::default());
        let report = reaper(Arc::clone(&store), 100).run().await.expect("tick");
        assert_eq!(report["purged"], 0);
        assert!(store.purge_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn purges_in_order_preserving_batches() {
        let store = Arc::new(RecordingStore {
            soft_deleted: (0..250).map(|i| format!("ins-{i}")).collect(),
            ..Default::default()
        });
        let report = reaper(Arc::clone(&store), 100).run().await.expect("tick");

        let calls = store.purge_calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].len(), 100);
        assert_eq!(calls[2].len(), 50);
        assert_eq!(calls[0][0], "ins-0");
        assert_eq!(calls[2][49], "ins-249");
        assert_eq!(report["purged"], 250);
    }

    #[tokio::test]
    async fn batch_failure_aborts_without_attempting_later_batches() {
        let store = Arc::new(RecordingStore {
            soft_deleted: (0..300).map(|i| format!("ins-{i}")).collect(),
            fail_at_call: Some(2),
            ..Default::default()
        });

        let err = reaper(Arc::clone(&store), 100).run().await.expect_err("tick fails");
        match err {
            JobError::Batch {
                failed_batch,
                total_batches,
                completed,
                ..
            } => {
                assert_eq!(failed_batch, 2);
                assert_eq!(total_batches, 3);
                assert_eq!(completed, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The first batch was submitted; the third never was.
        assert_eq!(store.purge_calls.lock().unwrap().len(), 1);
    }
}
