//! Database Connection Management
//!
//! PostgreSQL pool settings and pool creation with SQLx.

use sqlx::PgPool;
use std::time::Duration;

use crate::config::{env, ConfigError};

/// Database connection pool type alias for convenience
pub type DatabasePool = PgPool;

/// Database configuration for connection setup
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/clinic_registry".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

impl DatabaseConfig {
    /// Pool settings from `DATABASE_URL` and the `DB_*` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let seconds = |key: &str, default: Duration| {
            Duration::from_secs(env::get_u64(key, default.as_secs()))
        };

        Ok(Self {
            url: env::get_required("DATABASE_URL")?,
            max_connections: env::get_u32("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env::get_u32("DB_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout: seconds("DB_CONNECT_TIMEOUT", defaults.connect_timeout),
            idle_timeout: seconds("DB_IDLE_TIMEOUT", defaults.idle_timeout),
            max_lifetime: seconds("DB_MAX_LIFETIME", defaults.max_lifetime),
        })
    }

    /// Connection URL with any password masked, for logging
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((credentials, host)) = rest.rsplit_once('@') else {
            return self.url.clone();
        };

        match credentials.split_once(':') {
            Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
            None => self.url.clone(),
        }
    }

    /// Create a database connection pool from this configuration
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        log::info!(
            "Connecting to {} (pool {}..={})",
            self.redacted_url(),
            self.min_connections,
            self.max_connections
        );

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_redacted_url_masks_password() {
        assert_eq!(
            with_url("postgres://clinic:s3cret@db:5432/registry").redacted_url(),
            "postgres://clinic:***@db:5432/registry"
        );
        assert_eq!(
            with_url("postgres://clinic@db/registry").redacted_url(),
            "postgres://clinic@db/registry"
        );
        assert_eq!(
            with_url("postgresql://localhost/clinic_registry").redacted_url(),
            "postgresql://localhost/clinic_registry"
        );
    }
}
