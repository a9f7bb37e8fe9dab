//! Security Utilities
//!
//! Argon2id password hashing and verification. Hashes are stored as PHC
//! strings: `$argon2id$v=19$m=65536,t=2,p=4$<salt>$<hash>`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Number of `$`-separated fields in an encoded hash (leading empty field included)
const PHC_FIELD_COUNT: usize = 6;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    /// Derived key length in bytes
    pub output_len: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 2,
            parallelism: 4,
            output_len: 32,
        }
    }
}

#[derive(Error, Debug)]
pub enum PasswordHashError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Malformed password hash: {0}")]
    Malformed(String),

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str, config: &HashingConfig) -> Result<String, PasswordHashError> {
    let params = Params::new(
        config.memory_kib,
        config.iterations,
        config.parallelism,
        Some(config.output_len),
    )
    .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordHashError::Hashing(e.to_string()))
}

/// Verify a password against an encoded hash using the salt and cost
/// parameters embedded in the hash. Returns `Ok(false)` on mismatch and an
/// error when the hash itself cannot be parsed.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordHashError> {
    let field_count = encoded.split('$').count();
    if field_count != PHC_FIELD_COUNT {
        return Err(PasswordHashError::Malformed(format!(
            "expected {} fields, found {}",
            PHC_FIELD_COUNT, field_count
        )));
    }

    let parsed =
        PasswordHash::new(encoded).map_err(|e| PasswordHashError::Malformed(e.to_string()))?;
    if parsed.algorithm.as_str() != Algorithm::Argon2id.as_str() {
        return Err(PasswordHashError::UnsupportedAlgorithm(
            parsed.algorithm.as_str().to_string(),
        ));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordHashError::Hashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> HashingConfig {
        HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            output_len: 32,
        }
    }

    #[test]
    fn test_default_parameters() {
        let config = HashingConfig::default();
        assert_eq!(config.memory_kib, 65536);
        assert_eq!(config.iterations, 2);
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.output_len, 32);
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("Saqlain@123", &fast_config()).unwrap();

        assert_ne!(hash, "Saqlain@123");
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert_eq!(hash.split('$').count(), 6);
        assert!(verify_password("Saqlain@123", &hash).unwrap());
        assert!(!verify_password("Saqlain@124", &hash).unwrap());
    }

    #[test]
    fn test_salt_is_fresh_per_call() {
        let first = hash_password("Saqlain@123", &fast_config()).unwrap();
        let second = hash_password("Saqlain@123", &fast_config()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("x", "$argon2id$v=19$m=1024"),
            Err(PasswordHashError::Malformed(_))
        ));
        assert!(verify_password("x", "plaintext").is_err());
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let hash = hash_password("Saqlain@123", &fast_config()).unwrap();
        let argon2i = hash.replacen("argon2id", "argon2i", 1);
        assert!(matches!(
            verify_password("Saqlain@123", &argon2i),
            Err(PasswordHashError::UnsupportedAlgorithm(_))
        ));
    }
}
