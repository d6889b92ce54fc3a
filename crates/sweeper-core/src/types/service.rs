//! Registry service records as exchanged with the management API.

use serde::{Deserialize, Serialize};

/// A service as reported by the registry's service listing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service name, unique within its namespace.
    pub name: String,
    /// Namespace the service lives in.
    pub namespace: String,
    /// Total registered instances, healthy or not.
    #[serde(default)]
    pub total_instance_count: u32,
    /// Currently healthy instances.
    #[serde(default)]
    pub healthy_instance_count: u32,
}

impl Service {
    /// Whether the service has no registered instances at all.
    pub fn is_empty(&self) -> bool {
        self.total_instance_count == 0
    }

    /// Borrow this service as a deletion reference.
    pub fn as_ref_payload(&self) -> ServiceRef {
        ServiceRef {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Minimal service reference posted to the registry's service delete API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    /// Name of the service to delete.
    pub name: String,
    /// Namespace of the service to delete.
    pub namespace: String,
}

/// One page of a registry service listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicePage {
    /// Total matching services on the server, across all pages.
    #[serde(default)]
    pub amount: usize,
    /// Number of services in this page.
    #[serde(default)]
    pub size: usize,
    /// The service records of this page.
    #[serde(default)]
    pub services: Vec<Service>,
}
