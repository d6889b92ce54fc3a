//! The reconciliation job implementations.

pub mod crash;
pub mod empty_service;
pub mod soft_delete;
pub mod unhealthy;

pub use crash::CrashReconciler;
pub use empty_service::EmptyServiceReaper;
pub use soft_delete::SoftDeleteReaper;
pub use unhealthy::UnhealthyReaper;
