//! Registry service catalog seam.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{ServicePage, ServiceRef};

/// Access to the registry's service catalog.
///
/// Scoped to services the registry created automatically on first instance
/// registration; explicitly created services are never listed here and so
/// never become deletion candidates.
#[async_trait]
pub trait ServiceCatalog: Send + Sync + std::fmt::Debug {
    /// Fetch one page of the auto-created service listing.
    ///
    /// `offset` is the zero-based index of the first service to return and
    /// `limit` the maximum page size. The response carries the server-side
    /// total so callers can drive pagination to completion.
    async fn list_auto_created(&self, offset: usize, limit: usize) -> AppResult<ServicePage>;

    /// Delete the referenced services in one management call.
    ///
    /// The registry answers each reference individually; returns how many it
    /// accepted. A service that regained instances since listing is refused,
    /// which is expected and not an error.
    async fn delete_services(&self, services: &[ServiceRef]) -> AppResult<usize>;
}
