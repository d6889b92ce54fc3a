//! Instance repository — candidate selection and hard purges against the
//! registry's `instance` table.

use async_trait::async_trait;
use sqlx::PgPool;

use sweeper_core::error::{AppError, ErrorKind};
use sweeper_core::result::AppResult;
use sweeper_core::traits::InstanceStore;

/// Repository for stale-instance queries and bulk deletion.
#[derive(Debug, Clone)]
pub struct InstanceRepository {
    pool: PgPool,
}

impl InstanceRepository {
    /// Create a new instance repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstanceStore for InstanceRepository {
    async fn find_soft_deleted(&self, max_age_minutes: u32, limit: u32) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT id FROM instance \
             WHERE flag = 1 AND mtime <= NOW() - make_interval(mins => $1) \
             ORDER BY mtime LIMIT $2",
        )
        .bind(max_age_minutes as i32)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to query soft-deleted instances",
                e,
            )
        })
    }

    async fn find_unhealthy(&self, max_age_minutes: u32, limit: u32) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT id FROM instance \
             WHERE flag = 0 AND enable_health_check = 1 AND health_status = 0 \
             AND mtime <= NOW() - make_interval(mins => $1) \
             ORDER BY mtime LIMIT $2",
        )
        .bind(max_age_minutes as i32)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to query unhealthy instances",
                e,
            )
        })
    }

    async fn purge(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM instance WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge instances", e)
            })?;

        Ok(result.rows_affected())
    }
}
