//! # sweeper-database
//!
//! PostgreSQL connection management and the concrete [`InstanceStore`]
//! implementation backed by the registry's `instance` table.
//!
//! [`InstanceStore`]: sweeper_core::traits::InstanceStore

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::instance::InstanceRepository;
