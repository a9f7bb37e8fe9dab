//! User Model
//!
//! Patient-facing accounts. These live in their own namespace, separate from
//! owners and doctors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::Role;

/// User representation for external API responses
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,

    /// User's email address (normalized)
    pub email: String,

    pub address: String,
    pub age: i32,
    pub mobile: i64,
    pub pincode: i32,

    #[sqlx(try_from = "String")]
    pub role: Role,

    pub appointment_ids: Vec<Uuid>,
    pub registration_date: DateTime<Utc>,
}

/// Internal user representation including password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithPassword {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub age: i32,
    pub mobile: i64,
    pub pincode: i32,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub appointment_ids: Vec<Uuid>,
    pub registration_date: DateTime<Utc>,
}

impl From<UserWithPassword> for User {
    /// Strips the password hash
    fn from(user: UserWithPassword) -> Self {
        User {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            age: user.age,
            mobile: user.mobile,
            pincode: user.pincode,
            role: user.role,
            appointment_ids: user.appointment_ids,
            registration_date: user.registration_date,
        }
    }
}
