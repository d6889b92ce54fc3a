//! Registry management API client.

use std::time::Duration;

use rand::RngExt;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use sweeper_core::config::registry::RegistryConfig;
use sweeper_core::error::{AppError, ErrorKind};
use sweeper_core::result::AppResult;
use sweeper_core::traits::{RegistryApi, ServiceCatalog};
use sweeper_core::types::{InstancePage, InstanceRef, ServicePage, ServiceRef};

const LIST_PATH: &str = "/naming/v1/instances";
const DELETE_PATH: &str = "/naming/v1/instances/delete";
const SERVICE_LIST_PATH: &str = "/naming/v1/services";
const SERVICE_DELETE_PATH: &str = "/naming/v1/services/delete";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API-level success code carried in service listing and delete responses.
const API_SUCCESS_CODE: u32 = 200_000;

/// Metadata key/value marking services the registry created automatically.
const AUTO_CREATED_KEY: &str = "internal-auto-created";
const AUTO_CREATED_VALUE: &str = "true";

/// Structured error payload returned by the management API on failure.
#[derive(Debug, Deserialize)]
struct ApiFailure {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    info: String,
}

/// Wire shape of the service listing response; the page fields plus an
/// API-level status code.
#[derive(Debug, Deserialize)]
struct ServiceListResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    info: String,
    #[serde(default)]
    amount: usize,
    #[serde(default)]
    size: usize,
    #[serde(default)]
    services: Vec<sweeper_core::types::Service>,
}

/// Wire shape of the service delete response: one entry per requested
/// service, each with its own status code.
#[derive(Debug, Deserialize)]
struct ServiceDeleteResponse {
    #[serde(default)]
    responses: Vec<ServiceDeleteEntry>,
}

#[derive(Debug, Deserialize)]
struct ServiceDeleteEntry {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    info: String,
    service: ServiceRef,
}

/// HTTP client for the registry's management API.
///
/// Every request carries a content-type, a freshly generated request
/// identifier, an operator label, and the authorization token. The target
/// endpoint is picked pseudorandomly per request from the configured list.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    http: reqwest::Client,
    endpoints: Vec<String>,
    auth_token: String,
    request_id_prefix: String,
    operator: String,
}

impl HttpRegistryClient {
    /// Create a new client from configuration.
    ///
    /// Fails with a validation error when no endpoints are configured.
    pub fn new(config: &RegistryConfig) -> AppResult<Self> {
        if config.endpoints.is_empty() {
            return Err(AppError::validation(
                "registry.endpoints must not be empty",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
            auth_token: config.auth_token.clone(),
            request_id_prefix: config.request_id_prefix.clone(),
            operator: config.operator.clone(),
        })
    }

    /// Pick one endpoint pseudorandomly from the configured list.
    fn pick_endpoint(&self) -> &str {
        let idx = rand::rng().random_range(0..self.endpoints.len());
        &self.endpoints[idx]
    }

    /// Attach the standard management API headers to a request.
    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Content-Type", "application/json")
            .header(
                "Request-Id",
                format!("{}{}", self.request_id_prefix, Uuid::new_v4()),
            )
            .header("X-Staff-Name", &self.operator)
            .header("X-Auth-Token", &self.auth_token)
    }
}

#[async_trait::async_trait]
impl RegistryApi for HttpRegistryClient {
    async fn list_instances(
        &self,
        service: &str,
        namespace: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<InstancePage> {
        let url = format!("http://{}{}", self.pick_endpoint(), LIST_PATH);
        debug!(service, namespace, offset, limit, "Listing registry instances");

        let offset = offset.to_string();
        let limit = limit.to_string();
        let response = self
            .with_headers(self.http.get(&url))
            .query(&[
                ("service", service),
                ("namespace", namespace),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Instance listing request to {url} failed"),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external(format!(
                "Instance listing for service '{service}' (namespace '{namespace}') \
                 returned status {status}"
            )));
        }

        response.json::<InstancePage>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                "Failed to decode instance listing response",
                e,
            )
        })
    }

    async fn delete_instances(&self, instances: &[InstanceRef]) -> AppResult<()> {
        if instances.is_empty() {
            return Err(AppError::validation(
                "delete request must reference at least one instance",
            ));
        }

        let url = format!("http://{}{}", self.pick_endpoint(), DELETE_PATH);
        debug!(count = instances.len(), "Deleting registry instances");

        let response = self
            .with_headers(self.http.post(&url))
            .json(instances)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Instance delete request to {url} failed"),
                    e,
                )
            })?;

        // Success carries an empty body; only failures have a payload.
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let failure = response.json::<ApiFailure>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Instance delete returned status {status} with an undecodable body"),
                e,
            )
        })?;

        Err(AppError::external(format!(
            "Registry refused instance delete: code={}, info={}",
            failure.code, failure.info
        )))
    }
}

#[async_trait::async_trait]
impl ServiceCatalog for HttpRegistryClient {
    async fn list_auto_created(&self, offset: usize, limit: usize) -> AppResult<ServicePage> {
        let url = format!("http://{}{}", self.pick_endpoint(), SERVICE_LIST_PATH);
        debug!(offset, limit, "Listing auto-created services");

        let offset = offset.to_string();
        let limit = limit.to_string();
        let response = self
            .with_headers(self.http.get(&url))
            .query(&[
                ("keys", AUTO_CREATED_KEY),
                ("values", AUTO_CREATED_VALUE),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Service listing request to {url} failed"),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external(format!(
                "Service listing returned status {status}"
            )));
        }

        let listing = response.json::<ServiceListResponse>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                "Failed to decode service listing response",
                e,
            )
        })?;

        // The listing endpoint reports failures in the body, not the HTTP
        // status.
        if listing.code != API_SUCCESS_CODE {
            return Err(AppError::external(format!(
                "Registry refused service listing: code={}, info={}",
                listing.code, listing.info
            )));
        }

        Ok(ServicePage {
            amount: listing.amount,
            size: listing.size,
            services: listing.services,
        })
    }

    async fn delete_services(&self, services: &[ServiceRef]) -> AppResult<usize> {
        if services.is_empty() {
            return Err(AppError::validation(
                "delete request must reference at least one service",
            ));
        }

        let url = format!("http://{}{}", self.pick_endpoint(), SERVICE_DELETE_PATH);
        debug!(count = services.len(), "Deleting registry services");

        let response = self
            .with_headers(self.http.post(&url))
            .json(services)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Service delete request to {url} failed"),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let failure = response.json::<ApiFailure>().await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("Service delete returned status {status} with an undecodable body"),
                    e,
                )
            })?;
            return Err(AppError::external(format!(
                "Registry refused service delete: code={}, info={}",
                failure.code, failure.info
            )));
        }

        let outcome = response.json::<ServiceDeleteResponse>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                "Failed to decode service delete response",
                e,
            )
        })?;

        // Each service is answered individually; a refusal (typically a
        // service that regained instances since listing) is logged and
        // skipped rather than failing the whole call.
        let mut accepted = 0usize;
        for entry in &outcome.responses {
            if entry.code == API_SUCCESS_CODE {
                accepted += 1;
            } else {
                warn!(
                    service = %entry.service.name,
                    namespace = %entry.service.namespace,
                    code = entry.code,
                    info = %entry.info,
                    "Registry refused service delete"
                );
            }
        }

        Ok(accepted)
    }
}
