//! Credential Service
//!
//! Password hashing on blocking worker threads and HS256 access token
//! issuance/verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AccessTokenClaims, AuthContext, Role};
use crate::utils::error::AppError;
use crate::utils::security::{self, HashingConfig, PasswordHashError};

/// Default access token lifetime
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Signing secret, token lifetime and hashing cost
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub hashing: HashingConfig,
}

impl CredentialConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::days(DEFAULT_TOKEN_TTL_DAYS),
            hashing: HashingConfig::default(),
        }
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    pub fn with_hashing(mut self, hashing: HashingConfig) -> Self {
        self.hashing = hashing;
        self
    }
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Password hashing error: {0}")]
    Hashing(#[from] PasswordHashError),

    /// Bad signature, unexpected algorithm, malformed or expired token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    /// The blocking hashing task panicked or was cancelled
    #[error("Credential worker failed: {0}")]
    Worker(String),
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidToken(_) => {
                AppError::Authentication("Invalid or expired token".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

pub type CredentialResult<T> = Result<T, CredentialError>;

#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    hashing: HashingConfig,
}

impl CredentialService {
    pub fn new(config: CredentialConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: config.token_ttl,
            hashing: config.hashing,
        }
    }

    /// Hash a password into a PHC string
    pub async fn hash_password(&self, password: &str) -> CredentialResult<String> {
        let password = password.to_owned();
        let config = self.hashing;

        tokio::task::spawn_blocking(move || security::hash_password(&password, &config))
            .await
            .map_err(|e| CredentialError::Worker(e.to_string()))?
            .map_err(CredentialError::from)
    }

    /// Check a password against a stored PHC string.
    ///
    /// `Ok(false)` on mismatch; `Err` when the stored hash cannot be parsed.
    pub async fn verify_password(&self, password: &str, encoded: &str) -> CredentialResult<bool> {
        let password = password.to_owned();
        let encoded = encoded.to_owned();

        tokio::task::spawn_blocking(move || security::verify_password(&password, &encoded))
            .await
            .map_err(|e| CredentialError::Worker(e.to_string()))?
            .map_err(CredentialError::from)
    }

    /// Issue an access token for an account
    pub fn issue_token(&self, subject: Uuid, role: Role) -> CredentialResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims::new(subject, role, now, now + self.token_ttl);
        self.encode_claims(&claims)
    }

    /// Validate an access token and extract the caller context
    pub fn verify_token(&self, token: &str) -> CredentialResult<AuthContext> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| AuthContext::from(data.claims))
            .map_err(|e| CredentialError::InvalidToken(e.to_string()))
    }

    fn encode_claims(&self, claims: &AccessTokenClaims) -> CredentialResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CredentialError::TokenGeneration(e.to_string()))
    }
}

/// Cheap hashing parameters so tests stay fast
#[cfg(test)]
pub(crate) fn test_config() -> CredentialConfig {
    CredentialConfig::new("test_jwt_secret_key").with_hashing(HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
        output_len: 32,
    })
}
