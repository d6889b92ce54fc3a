//! Registry instance records as exchanged with the management API.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Metadata key carrying the owning-cluster identity of an instance.
pub const CLUSTER_TAG_KEY: &str = "cluster-id";

/// A service instance as reported by the registry listing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Unique identifier within the registry.
    pub id: String,
    /// Host address the instance runs on.
    pub host: String,
    /// Port the instance listens on.
    #[serde(default)]
    pub port: u16,
    /// Arbitrary key-value metadata, including the owning-cluster tag.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Instance {
    /// Whether this instance belongs to the given cluster.
    ///
    /// An absent tag counts as owned; only an explicit foreign tag excludes
    /// the instance from reconciliation.
    pub fn owned_by(&self, cluster: &str) -> bool {
        match self.metadata.get(CLUSTER_TAG_KEY) {
            Some(tag) => tag == cluster,
            None => true,
        }
    }

    /// Borrow this instance as a deletion reference.
    pub fn as_ref_payload(&self) -> InstanceRef {
        InstanceRef {
            id: self.id.clone(),
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{id={}, host={}, port={}}}", self.id, self.host, self.port)
    }
}

/// Minimal instance reference posted to the registry delete API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    /// Identifier of the instance to delete.
    pub id: String,
}

/// One page of a registry instance listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstancePage {
    /// Total matching instances on the server, across all pages.
    #[serde(default)]
    pub amount: usize,
    /// Number of instances in this page.
    #[serde(default)]
    pub size: usize,
    /// The instance records of this page.
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance_with_tag(tag: Option<&str>) -> Instance {
        let mut metadata = HashMap::new();
        if let Some(tag) = tag {
            metadata.insert(CLUSTER_TAG_KEY.to_string(), tag.to_string());
        }
        Instance {
            id: "ins-1".to_string(),
            host: "10.0.0.1".to_string(),
            port: 8091,
            metadata,
        }
    }

    #[test]
    fn untagged_instance_is_owned() {
        assert!(instance_with_tag(None).owned_by("cluster-a"));
    }

    #[test]
    fn matching_tag_is_owned() {
        assert!(instance_with_tag(Some("cluster-a")).owned_by("cluster-a"));
    }

    #[test]
    fn foreign_tag_is_not_owned() {
        assert!(!instance_with_tag(Some("cluster-b")).owned_by("cluster-a"));
    }

    #[test]
    fn page_deserializes_with_missing_fields() {
        let page: InstancePage = serde_json::from_str(r#"{"amount": 3}"#).expect("deserialize");
        assert_eq!(page.amount, 3);
        assert_eq!(page.size, 0);
        assert!(page.instances.is_empty());
    }
}
