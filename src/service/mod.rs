//! Service Layer
//!
//! Credential handling and the registration, search and login flows.

pub mod credentials;
pub mod registry;
pub mod user;

// Re-export services
pub use credentials::{CredentialConfig, CredentialError, CredentialService};
pub use registry::{RegistryError, RegistryService};
pub use user::{UserService, UserServiceError};
