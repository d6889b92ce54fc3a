//! # sweeper-core
//!
//! Core crate for RegSweep. Contains configuration schemas, shared domain
//! types, the trait seams toward the registry / orchestration platform /
//! store, and the unified error system.
//!
//! This crate has **no** internal dependencies on other RegSweep crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
