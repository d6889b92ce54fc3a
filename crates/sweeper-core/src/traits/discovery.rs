//! Orchestration platform seam.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::result::AppResult;

/// Lookup of live backing workloads on the orchestration platform.
#[async_trait]
pub trait EndpointDiscovery: Send + Sync + std::fmt::Debug {
    /// Return the set of ready endpoint addresses backing the named workload
    /// in the given namespace. A workload with no ready endpoints yields an
    /// empty set, not an error.
    async fn ready_addresses(&self, namespace: &str, workload: &str) -> AppResult<HashSet<String>>;
}
