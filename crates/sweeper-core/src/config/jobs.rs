//! Per-job schedule and limit configuration.

use serde::{Deserialize, Serialize};

/// Settings for all reconciliation jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Soft-delete reaper settings.
    #[serde(default = "default_soft_delete")]
    pub soft_delete: ReaperSettings,
    /// Unhealthy-instance reaper settings.
    #[serde(default = "default_unhealthy")]
    pub unhealthy: ReaperSettings,
    /// Crash reconciler settings.
    #[serde(default)]
    pub crash: CrashSettings,
    /// Empty-service reaper settings.
    #[serde(default)]
    pub empty_service: ServiceSweepSettings,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            soft_delete: default_soft_delete(),
            unhealthy: default_unhealthy(),
            crash: CrashSettings::default(),
            empty_service: ServiceSweepSettings::default(),
        }
    }
}

/// Settings shared by the two batch-delete reapers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperSettings {
    /// Whether the job is registered at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron schedule (seconds optional).
    pub cron: String,
    /// Minimum age in minutes before a record becomes a deletion candidate.
    #[serde(default = "default_max_age_minutes")]
    pub max_age_minutes: u32,
    /// Maximum candidate rows fetched per tick.
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
    /// Identifiers per delete call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Settings for the crash reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashSettings {
    /// Whether the job is registered at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron schedule (seconds optional).
    #[serde(default = "default_crash_cron")]
    pub cron: String,
}

impl Default for CrashSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cron: default_crash_cron(),
        }
    }
}

/// Settings for the empty-service reaper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSweepSettings {
    /// Whether the job is registered at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron schedule (seconds optional).
    #[serde(default = "default_empty_service_cron")]
    pub cron: String,
    /// Services per delete call.
    #[serde(default = "default_service_batch_size")]
    pub batch_size: usize,
}

impl Default for ServiceSweepSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cron: default_empty_service_cron(),
            batch_size: default_service_batch_size(),
        }
    }
}

fn default_soft_delete() -> ReaperSettings {
    ReaperSettings {
        enabled: true,
        cron: "0 0 1 * * *".to_string(),
        max_age_minutes: default_max_age_minutes(),
        max_rows: default_max_rows(),
        batch_size: default_batch_size(),
    }
}

fn default_unhealthy() -> ReaperSettings {
    ReaperSettings {
        enabled: true,
        cron: "0 0 2 * * *".to_string(),
        max_age_minutes: default_max_age_minutes(),
        max_rows: default_max_rows(),
        batch_size: default_batch_size(),
    }
}

fn default_crash_cron() -> String {
    "0 * * * * *".to_string()
}

fn default_empty_service_cron() -> String {
    // hourly
    "0 0 * * * *".to_string()
}

fn default_service_batch_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_max_age_minutes() -> u32 {
    // one day
    1440
}

fn default_max_rows() -> u32 {
    10_000
}

fn default_batch_size() -> usize {
    100
}
