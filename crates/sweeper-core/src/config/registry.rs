//! Registry management API configuration.

use serde::{Deserialize, Serialize};

/// Settings for the registry's HTTP management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry endpoints (`host:port`). One is picked pseudorandomly per
    /// request.
    pub endpoints: Vec<String>,
    /// Authorization token sent with every management call.
    pub auth_token: String,
    /// Prefix for generated request identifiers.
    #[serde(default = "default_request_id_prefix")]
    pub request_id_prefix: String,
    /// Operator label attached to delete requests for audit purposes.
    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_request_id_prefix() -> String {
    "regsweep-".to_string()
}

fn default_operator() -> String {
    "regsweep".to_string()
}
