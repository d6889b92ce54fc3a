//! Trait seams toward the external collaborators.
//!
//! Jobs depend on these traits rather than on concrete clients so that the
//! reconciliation logic can be exercised against in-memory fakes.

pub mod catalog;
pub mod discovery;
pub mod registry;
pub mod store;

pub use catalog::ServiceCatalog;
pub use discovery::EndpointDiscovery;
pub use registry::RegistryApi;
pub use store::InstanceStore;
