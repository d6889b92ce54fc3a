//! Cluster identity configuration.

use serde::{Deserialize, Serialize};

/// Identity of the cluster this agent reconciles.
///
/// Instances tagged with a different cluster identity in their metadata are
/// never touched by this process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Unique identity of this cluster. Matched against the owning-cluster
    /// metadata tag on every instance.
    pub identity: String,
    /// Registry namespace the reconciled services live in.
    pub namespace: String,
    /// Name of the backing workload on the orchestration platform.
    pub workload: String,
    /// Registry services whose instances are checked for crashed hosts.
    #[serde(default)]
    pub checking_services: Vec<String>,
}
