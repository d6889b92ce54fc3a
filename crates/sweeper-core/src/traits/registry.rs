//! Registry management API seam.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{InstancePage, InstanceRef};

/// Read/write access to the registry's HTTP management API.
#[async_trait]
pub trait RegistryApi: Send + Sync + std::fmt::Debug {
    /// Fetch one page of the instance listing for a service.
    ///
    /// `offset` is the zero-based index of the first instance to return and
    /// `limit` the maximum page size. The response carries the server-side
    /// total so callers can drive pagination to completion.
    async fn list_instances(
        &self,
        service: &str,
        namespace: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<InstancePage>;

    /// Delete the referenced instances in one management call.
    ///
    /// Deletion is idempotent on the registry side; deleting an already
    /// removed instance is not an error.
    async fn delete_instances(&self, instances: &[InstanceRef]) -> AppResult<()>;
}
