//! Clinic Registry Library
//!
//! Registration and directory service for clinics, clinic owners, doctors and
//! patient-facing users. Owners register and link exactly one clinic, doctors
//! register with clinic affiliations, and every account logs in with email and
//! password to receive a role-bearing bearer token.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use clinic_registry::{
//!     api::{AppState, RouterBuilder},
//!     database::InMemoryRepository,
//!     service::{CredentialConfig, CredentialService},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Arc::new(CredentialService::new(CredentialConfig::new("secret")));
//!     let state = AppState::new(
//!         Arc::new(InMemoryRepository::new()),
//!         credentials.clone(),
//!         Duration::from_secs(2),
//!     );
//!
//!     // Directory endpoints only, without patient accounts
//!     let app = RouterBuilder::with_directory_routes()
//!         .build(credentials)
//!         .with_state(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **API Layer**: axum handlers, bearer authentication, role guards and routing
//! - **Service Layer**: registration, search and login flows plus credential handling
//! - **Models**: entities, joined views, search filters and request payloads
//! - **Database**: repository traits with PostgreSQL and in-memory adapters
//! - **Utils**: error envelopes, password hashing and field validation

/// HTTP API layer with handlers and configurable routing
pub mod api;

/// Environment-driven configuration
pub mod config;

/// Repository ports, adapters and connection management
pub mod database;

/// Data models and request/response structures
pub mod models;

/// Registration, search and login services
pub mod service;

/// Shared utilities for security, validation, and error handling
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, RouterBuilder};
pub use config::{env, AppConfig, ConfigError, JwtConfig, ServerConfig};
pub use database::{DatabaseConfig, DatabasePool, InMemoryRepository, PgRepository};
pub use models::{
    AuthContext, Clinic, ClinicDetails, Doctor, DoctorDetails, Owner, OwnerDetails, Role, User,
};
pub use service::{CredentialService, RegistryService, UserService};
pub use utils::error::{AppError, AppResult, ErrorResponse};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
