//! Database Module
//!
//! Connection pooling, the repository ports and their PostgreSQL and
//! in-memory adapters.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use connection::{DatabaseConfig, DatabasePool};
pub use memory::InMemoryRepository;
pub use postgres::PgRepository;
pub use repository::{ClinicRepository, RepositoryError, RepositoryResult, UserRepository};
