//! Authentication Models
//!
//! Account roles, JWT claims and the authenticated caller context.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role carried in tokens and stored with every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
    Doctor,
    ClinicOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::Doctor => "Doctor",
            Role::ClinicOwner => "ClinicOwner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            "Doctor" => Ok(Role::Doctor),
            "ClinicOwner" => Ok(Role::ClinicOwner),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// JWT claims structure for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject - account ID
    pub sub: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID - unique token identifier
    pub jti: String,
}

impl AccessTokenClaims {
    pub fn new(
        subject: Uuid,
        role: Role,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Authenticated caller, extracted from a verified token
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Token subject as issued; parsed into an id only where one is needed
    pub subject: String,
    pub role: Role,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn subject_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.subject).ok()
    }
}

impl From<AccessTokenClaims> for AuthContext {
    fn from(claims: AccessTokenClaims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
            token_id: claims.jti,
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
        }
    }
}
