//! API Layer
//!
//! HTTP endpoints, authentication middleware and request extraction for the
//! clinic registry.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod user_handlers;

// Re-export commonly used types
pub use extractors::ApiJson;
pub use handlers::{AppState, SuccessResponse};
pub use middleware::{auth_middleware, extract_auth_user, require_roles, AuthUser};
pub use routes::{create_routes, RouterBuilder};
