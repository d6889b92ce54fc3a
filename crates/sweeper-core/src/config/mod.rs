//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod cluster;
pub mod database;
pub mod jobs;
pub mod logging;
pub mod platform;
pub mod registry;

use serde::{Deserialize, Serialize};

use self::cluster::ClusterConfig;
use self::database::DatabaseConfig;
use self::jobs::JobsConfig;
use self::logging::LoggingConfig;
use self::platform::PlatformConfig;
use self::registry::RegistryConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identity of this agent and the services it reconciles.
    pub cluster: ClusterConfig,
    /// Registry store connection settings.
    pub database: DatabaseConfig,
    /// Registry management API settings.
    pub registry: RegistryConfig,
    /// Orchestration platform API settings.
    pub platform: PlatformConfig,
    /// Per-job schedules and limits.
    #[serde(default)]
    pub jobs: JobsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `REGSWEEP`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("REGSWEEP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
