//! Crash reconciler — deletes registry instances whose backing host has
//! disappeared from the orchestration platform.
//!
//! The platform's ready-endpoint set and the registry listing are updated
//! independently and are only eventually consistent, so a single observed
//! discrepancy must not trigger a delete. A host absent from the ready set
//! is first marked suspected; only when it is still absent on the next tick
//! are its instances deleted. A host that reappears in the ready set, or
//! drops out of the registry listing, is cleared from the suspected set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use sweeper_core::config::cluster::ClusterConfig;
use sweeper_core::config::jobs::CrashSettings;
use sweeper_core::error::AppError;
use sweeper_core::result::AppResult;
use sweeper_core::traits::{EndpointDiscovery, RegistryApi};
use sweeper_core::types::{Instance, InstanceRef};

use crate::job::{CleanupJob, JobError};
use crate::paging::InstancePager;

/// Reconciles the registry listing against the platform's ready endpoints.
///
/// The suspected-host set is the only cross-tick state in the whole engine.
/// It lives in memory for the job's lifetime; a process restart resets all
/// hysteresis to zero. Ticks are serialized by the scheduler, but the set is
/// still guarded by a mutex since the timer engine alone does not enforce
/// that.
#[derive(Debug)]
pub struct CrashReconciler {
    registry: Arc<dyn RegistryApi>,
    discovery: Arc<dyn EndpointDiscovery>,
    cluster: ClusterConfig,
    settings: CrashSettings,
    /// Hosts observed absent from the ready set on a prior tick.
    suspected: Mutex<HashSet<String>>,
}

impl CrashReconciler {
    /// Create a new crash reconciler.
    ///
    /// Fails with a validation error when required settings are missing;
    /// such a job is never scheduled.
    pub fn new(
        registry: Arc<dyn RegistryApi>,
        discovery: Arc<dyn EndpointDiscovery>,
        cluster: ClusterConfig,
        settings: CrashSettings,
    ) -> AppResult<Self> {
        if cluster.identity.is_empty() {
            return Err(AppError::validation("cluster.identity must not be empty"));
        }
        if cluster.workload.is_empty() {
            return Err(AppError::validation("cluster.workload must not be empty"));
        }
        if cluster.checking_services.is_empty() {
            return Err(AppError::validation(
                "cluster.checking_services must not be empty",
            ));
        }

        Ok(Self {
            registry,
            discovery,
            cluster,
            settings,
            suspected: Mutex::new(HashSet::new()),
        })
    }

    /// Enumerate the full registry listing for every checked service,
    /// grouped by host.
    async fn collect_listing(&self) -> AppResult<HashMap<String, Vec<Instance>>> {
        let mut by_host: HashMap<String, Vec<Instance>> = HashMap::new();

        for service in &self.cluster.checking_services {
            let mut pager =
                InstancePager::new(self.registry.as_ref(), service, &self.cluster.namespace);
            while let Some(page) = pager.next_page().await? {
                for instance in page {
                    by_host
                        .entry(instance.host.clone())
                        .or_default()
                        .push(instance);
                }
            }
        }

        Ok(by_host)
    }

    /// Drop instances owned by a foreign cluster, and hosts left with no
    /// owned instances. One cluster's reconciler never deletes another's.
    fn filter_owned(
        &self,
        mut by_host: HashMap<String, Vec<Instance>>,
    ) -> HashMap<String, Vec<Instance>> {
        for instances in by_host.values_mut() {
            instances.retain(|instance| instance.owned_by(&self.cluster.identity));
        }
        by_host.retain(|_, instances| !instances.is_empty());
        by_host
    }
}

#[async_trait]
impl CleanupJob for CrashReconciler {
    fn name(&self) -> &str {
        "crash_reconciler"
    }

    fn cron_spec(&self) -> &str {
        &self.settings.cron
    }

    async fn run(&self) -> Result<Value, JobError> {
        // Step 1: platform view. Failure aborts the tick with no state
        // change.
        let ready = self
            .discovery
            .ready_addresses(&self.cluster.namespace, &self.cluster.workload)
            .await
            .map_err(JobError::Transient)?;

        let mut suspected = self.suspected.lock().await;

        // Step 2: hosts back in the ready set have recovered.
        suspected.retain(|host| !ready.contains(host));

        // Steps 3 and 4: full registry listing, reduced to instances this
        // cluster owns. A paging error aborts before any suspicion changes
        // beyond the recovery pass above.
        let listing = self.collect_listing().await.map_err(JobError::Transient)?;
        let owned = self.filter_owned(listing);

        let mut first_strikes = 0usize;
        let mut hosts_swept = 0usize;
        let mut instances_deleted = 0usize;
        let mut delete_failures = 0usize;

        // Step 5: two-strike suspicion for hosts the platform no longer
        // backs.
        for (host, instances) in &owned {
            if ready.contains(host) {
                continue;
            }

            if !suspected.contains(host) {
                info!(%host, "Host absent from ready set, marking suspected");
                suspected.insert(host.clone());
                first_strikes += 1;
                continue;
            }

            info!(
                %host,
                instances = instances.len(),
                "Host absent for a second consecutive tick, deleting its instances"
            );
            let refs: Vec<InstanceRef> = instances.iter().map(Instance::as_ref_payload).collect();
            match self.registry.delete_instances(&refs).await {
                Ok(()) => {
                    hosts_swept += 1;
                    instances_deleted += refs.len();
                    // The host stays suspected until the registry listing
                    // reflects the delete; the cleanup pass below clears it
                    // once the instances are gone.
                }
                Err(e) => {
                    // One host's failure must not stop the others; retried
                    // next tick.
                    warn!(%host, error = %e, "Failed to delete instances for host");
                    delete_failures += 1;
                }
            }
        }

        // Step 6: drop suspicion for hosts that recovered or that the
        // registry no longer reports.
        suspected.retain(|host| !ready.contains(host) && owned.contains_key(host));

        Ok(serde_json::json!({
            "ready_endpoints": ready.len(),
            "listed_hosts": owned.len(),
            "first_strikes": first_strikes,
            "suspected": suspected.len(),
            "hosts_swept": hosts_swept,
            "instances_deleted": instances_deleted,
            "delete_failures": delete_failures,
        }))
    }
}
