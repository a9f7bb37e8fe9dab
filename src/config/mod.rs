//! Configuration Module
//!
//! Environment-driven configuration for the server, database, token signing
//! and password hashing. A `.env` file is honoured when `main` loads it.

use std::time::Duration;

use thiserror::Error;

use crate::database::DatabaseConfig;
use crate::service::CredentialConfig;
use crate::utils::security::HashingConfig;

/// Environment variable helpers
pub mod env {
    use std::env;

    use super::ConfigError;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a required environment variable
    pub fn get_required(key: &str) -> Result<String, ConfigError> {
        env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(String),

    #[error("Environment variable {key} has an invalid value: {reason}")]
    Invalid { key: String, reason: String },
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub hashing: HashingConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request deadline applied to every handler
    pub request_timeout_ms: u64,
}

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_days: i64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::get_required("PORT")?;
        let port = port.parse().map_err(|_| ConfigError::Invalid {
            key: "PORT".to_string(),
            reason: format!("'{}' is not a port number", port),
        })?;

        Ok(Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port,
            request_timeout_ms: env::get_u64("REQUEST_TIMEOUT_MS", 2000),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env::get_required("JWT_SECRET")?,
            expires_days: env::get_i64("JWT_EXPIRES_DAYS", 7),
        })
    }
}

fn hashing_from_env() -> HashingConfig {
    let defaults = HashingConfig::default();
    HashingConfig {
        memory_kib: env::get_u32("ARGON2_MEMORY_KIB", defaults.memory_kib),
        iterations: env::get_u32("ARGON2_ITERATIONS", defaults.iterations),
        parallelism: env::get_u32("ARGON2_PARALLELISM", defaults.parallelism),
        output_len: defaults.output_len,
    }
}

impl AppConfig {
    /// Load complete application configuration from environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            hashing: hashing_from_env(),
        })
    }

    /// Validate the complete configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: &str| ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if self.server.port == 0 {
            return Err(invalid("PORT", "must be greater than 0"));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(invalid("REQUEST_TIMEOUT_MS", "must be greater than 0"));
        }

        if self.database.max_connections == 0 {
            return Err(invalid("DB_MAX_CONNECTIONS", "must be greater than 0"));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(invalid(
                "DB_MIN_CONNECTIONS",
                "cannot be greater than DB_MAX_CONNECTIONS",
            ));
        }

        if self.jwt.secret.trim().is_empty() {
            return Err(invalid("JWT_SECRET", "cannot be empty"));
        }

        if self.jwt.expires_days <= 0 {
            return Err(invalid("JWT_EXPIRES_DAYS", "must be at least one day"));
        }

        Ok(())
    }

    /// Signing and hashing settings for the credential service
    pub fn credential_config(&self) -> CredentialConfig {
        CredentialConfig::new(self.jwt.secret.clone())
            .with_token_ttl(chrono::Duration::days(self.jwt.expires_days))
            .with_hashing(self.hashing)
    }
}
