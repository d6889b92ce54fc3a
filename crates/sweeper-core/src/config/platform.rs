//! Orchestration platform configuration.

use serde::{Deserialize, Serialize};

/// Settings for querying the container orchestration platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the platform API server.
    pub api_server: String,
    /// Bearer token for platform API calls.
    #[serde(default)]
    pub token: String,
    /// Accept invalid TLS certificates (in-cluster self-signed CA).
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}
