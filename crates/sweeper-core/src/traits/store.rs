//! Registry store seam.

use async_trait::async_trait;

use crate::result::AppResult;

/// Direct access to the registry's backing store.
///
/// Used by the reapers for candidate selection and by the soft-delete reaper
/// for hard purges that bypass the management API.
#[async_trait]
pub trait InstanceStore: Send + Sync + std::fmt::Debug {
    /// Identifiers of logically-deleted instances whose last modification is
    /// at least `max_age_minutes` old, capped at `limit` rows.
    async fn find_soft_deleted(&self, max_age_minutes: u32, limit: u32) -> AppResult<Vec<String>>;

    /// Identifiers of health-check-enabled instances in failed health state
    /// whose last modification is at least `max_age_minutes` old, capped at
    /// `limit` rows.
    async fn find_unhealthy(&self, max_age_minutes: u32, limit: u32) -> AppResult<Vec<String>>;

    /// Hard-delete the given instance rows. Returns the number of rows
    /// actually removed.
    async fn purge(&self, ids: &[String]) -> AppResult<u64>;
}
