//! Shared domain types.

pub mod instance;
pub mod service;

pub use instance::{CLUSTER_TAG_KEY, Instance, InstancePage, InstanceRef};
pub use service::{Service, ServicePage, ServiceRef};
