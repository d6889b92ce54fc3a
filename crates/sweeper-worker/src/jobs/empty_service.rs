//! Empty-service reaper — deletes auto-created services that no longer have
//! any registered instances.
//!
//! The registry creates a service on first instance registration; once the
//! last instance is gone the service record lingers forever unless something
//! removes it. Only auto-created services are candidates; explicitly created
//! services are never touched.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use sweeper_core::config::jobs::ServiceSweepSettings;
use sweeper_core::traits::ServiceCatalog;
use sweeper_core::types::{Service, ServiceRef};

use crate::batch;
use crate::job::{CleanupJob, JobError};

/// Deletes instance-less auto-created services in small batches.
///
/// Unlike the instance reapers, a failed delete batch does not abort the
/// tick: the remaining batches are still attempted and the failed services
/// are simply listed again next tick. The delete call is also individually
/// refusable per service, so a service that regained instances between
/// listing and delete is skipped by the registry, not an error.
#[derive(Debug)]
pub struct EmptyServiceReaper {
    catalog: Arc<dyn ServiceCatalog>,
    settings: ServiceSweepSettings,
}

impl EmptyServiceReaper {
    /// Create a new empty-service reaper.
    pub fn new(catalog: Arc<dyn ServiceCatalog>, settings: ServiceSweepSettings) -> Self {
        Self { catalog, settings }
    }

    /// Page the auto-created service listing and keep the instance-less
    /// entries.
    async fn collect_empty(&self) -> Result<Vec<ServiceRef>, JobError> {
        let mut pager = crate::paging::ServicePager::new(self.catalog.as_ref());
        let mut empty = Vec::new();

        while let Some(page) = pager.next_page().await.map_err(JobError::Transient)? {
            empty.extend(
                page.iter()
                    .filter(|service| service.is_empty())
                    .map(Service::as_ref_payload),
            );
        }

        Ok(empty)
    }
}

#[async_trait]
impl CleanupJob for EmptyServiceReaper {
    fn name(&self) -> &str {
        "empty_service_reaper"
    }

    fn cron_spec(&self) -> &str {
        &self.settings.cron
    }

    async fn run(&self) -> Result<Value, JobError> {
        let candidates = self.collect_empty().await?;

        // An empty candidate set is a normal no-op.
        if candidates.is_empty() {
            return Ok(serde_json::json!({
                "candidates": 0,
                "deleted": 0,
            }));
        }

        info!(
            candidates = candidates.len(),
            "Deleting empty auto-created services"
        );

        let batch_size = match self.settings.batch_size {
            0 => batch::DEFAULT_BATCH_SIZE,
            size => size,
        };
        let total_batches = candidates.len().div_ceil(batch_size);
        let mut deleted = 0usize;
        let mut batch_failures = 0usize;

        for chunk in batch::split(&candidates, batch_size) {
            match self.catalog.delete_services(chunk).await {
                Ok(accepted) => deleted += accepted,
                Err(e) => {
                    // The listing is re-taken next tick; a failed batch is
                    // retried then rather than stopping the remaining ones.
                    warn!(
                        services = chunk.len(),
                        error = %e,
                        "Service delete batch failed"
                    );
                    batch_failures += 1;
                }
            }
        }

        Ok(serde_json::json!({
            "candidates": candidates.len(),
            "deleted": deleted,
            "batches": total_batches,
            "batch_failures": batch_failures,
        }))
    }
}
