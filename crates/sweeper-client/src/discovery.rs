//! Orchestration platform endpoint discovery.
//!
//! Queries the platform API server for the ready endpoint addresses backing
//! a named workload, which the crash reconciler cross-references against the
//! registry listing.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use sweeper_core::config::platform::PlatformConfig;
use sweeper_core::error::{AppError, ErrorKind};
use sweeper_core::result::AppResult;
use sweeper_core::traits::EndpointDiscovery;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire shape of the platform's endpoints object.
#[derive(Debug, Deserialize)]
struct EndpointsObject {
    #[serde(default)]
    subsets: Vec<EndpointSubset>,
}

#[derive(Debug, Deserialize)]
struct EndpointSubset {
    #[serde(default)]
    addresses: Vec<EndpointAddress>,
}

#[derive(Debug, Deserialize)]
struct EndpointAddress {
    ip: String,
}

/// Endpoint discovery against a Kubernetes-style platform API.
#[derive(Debug, Clone)]
pub struct KubeEndpointDiscovery {
    http: reqwest::Client,
    api_server: String,
    token: String,
}

impl KubeEndpointDiscovery {
    /// Create a new discovery client from configuration.
    pub fn new(config: &PlatformConfig) -> AppResult<Self> {
        if config.api_server.is_empty() {
            return Err(AppError::validation("platform.api_server must not be empty"));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            api_server: config.api_server.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }
}

#[async_trait::async_trait]
impl EndpointDiscovery for KubeEndpointDiscovery {
    async fn ready_addresses(&self, namespace: &str, workload: &str) -> AppResult<HashSet<String>> {
        let url = format!(
            "{}/api/v1/namespaces/{namespace}/endpoints/{workload}",
            self.api_server
        );
        debug!(namespace, workload, "Querying platform ready endpoints");

        let mut request = self.http.get(&url);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Endpoint lookup request to {url} failed"),
                e,
            )
        })?;

        // A workload with no endpoints object yet simply has nothing ready.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(HashSet::new());
        }

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external(format!(
                "Endpoint lookup for workload '{workload}' (namespace '{namespace}') \
                 returned status {status}"
            )));
        }

        let endpoints = response.json::<EndpointsObject>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                "Failed to decode endpoints response",
                e,
            )
        })?;

        let addresses = endpoints
            .subsets
            .into_iter()
            .flat_map(|subset| subset.addresses)
            .map(|address| address.ip)
            .collect();

        Ok(addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn discovery_for(server: &MockServer) -> KubeEndpointDiscovery {
        KubeEndpointDiscovery::new(&PlatformConfig {
            api_server: server.uri(),
            token: "platform-token".to_string(),
            insecure_skip_tls_verify: false,
        })
        .expect("discovery")
    }

    #[tokio::test]
    async fn collects_addresses_across_subsets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/production/endpoints/naming"))
            .and(header("Authorization", "Bearer platform-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subsets": [
                    {"addresses": [{"ip": "10.0.0.1"}, {"ip": "10.0.0.2"}]},
                    {"addresses": [{"ip": "10.0.0.3"}]},
                    {"addresses": []}
                ]
            })))
            .mount(&server)
            .await;

        let discovery = discovery_for(&server);
        let ready = discovery
            .ready_addresses("production", "naming")
            .await
            .expect("addresses");
        assert_eq!(ready.len(), 3);
        assert!(ready.contains("10.0.0.2"));
    }

    #[tokio::test]
    async fn missing_endpoints_object_is_empty_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let discovery = discovery_for(&server);
        let ready = discovery
            .ready_addresses("production", "naming")
            .await
            .expect("empty set");
        assert!(ready.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let discovery = discovery_for(&server);
        let err = discovery
            .ready_addresses("production", "naming")
            .await
            .expect_err("must fail");
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }
}
