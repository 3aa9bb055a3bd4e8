//! Configuration Module
//!
//! Environment-driven configuration and credentials.

pub mod endpoint;
pub mod loader;

pub use endpoint::{KeyCredential, Operation, ServiceEndpoint, ServiceFlavor};
pub use loader::{ConfigLoader, SampleConfig};
