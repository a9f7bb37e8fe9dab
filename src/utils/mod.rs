//! Utilities Module
//!
//! Shared utilities for error handling, password security and payload
//! validation.

pub mod error;
pub mod security;
pub mod validation;

// Re-export commonly used utilities
pub use error::{AppError, AppResult, ErrorResponse, FieldErrors};
pub use security::{HashingConfig, PasswordHashError};
pub use validation::normalize_email;
