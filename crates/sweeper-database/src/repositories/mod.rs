//! Concrete repository implementations.

pub mod instance;
