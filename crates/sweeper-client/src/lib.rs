//! # sweeper-client
//!
//! Concrete HTTP clients behind the core trait seams: the registry
//! management API ([`HttpRegistryClient`]) and the orchestration platform's
//! endpoint lookup ([`KubeEndpointDiscovery`]).

pub mod discovery;
pub mod registry;

pub use discovery::KubeEndpointDiscovery;
pub use registry::HttpRegistryClient;
