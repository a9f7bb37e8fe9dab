//! Clinic Owner Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::Role;
use super::clinic::ClinicSummary;

/// Clinic owner profile without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: Uuid,
    pub name: String,

    /// Normalized (trimmed, lower-cased) email
    pub email: String,

    pub address: String,
    pub gender: String,
    pub mobile: i64,

    #[sqlx(try_from = "String")]
    pub role: Role,

    /// Set once, when the owner's clinic is registered
    pub clinic_id: Option<Uuid>,

    pub registration_date: DateTime<Utc>,
}

/// Stored owner record including the password hash
///
/// Used for inserts and credential checks. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnerWithPassword {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub gender: String,
    pub mobile: i64,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub clinic_id: Option<Uuid>,
    pub registration_date: DateTime<Utc>,
}

impl From<OwnerWithPassword> for Owner {
    fn from(owner: OwnerWithPassword) -> Self {
        Owner {
            id: owner.id,
            name: owner.name,
            email: owner.email,
            address: owner.address,
            gender: owner.gender,
            mobile: owner.mobile,
            role: owner.role,
            clinic_id: owner.clinic_id,
            registration_date: owner.registration_date,
        }
    }
}

/// Owner fields embedded in clinic search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: i64,
    pub gender: String,
}

impl From<&Owner> for OwnerSummary {
    fn from(owner: &Owner) -> Self {
        Self {
            id: owner.id,
            name: owner.name.clone(),
            email: owner.email.clone(),
            mobile: owner.mobile,
            gender: owner.gender.clone(),
        }
    }
}

/// Owner search result: the owner plus its clinic, when one is linked
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetails {
    #[serde(flatten)]
    pub owner: Owner,
    pub clinic_details: Option<ClinicSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_owner() -> OwnerWithPassword {
        OwnerWithPassword {
            id: Uuid::new_v4(),
            name: "Saqlain".to_string(),
            email: "saqlain@gmail.com".to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=2,p=4$c2FsdA$aGFzaA".to_string(),
            address: "Soura Srinagar".to_string(),
            gender: "Male".to_string(),
            mobile: 9797798243,
            role: Role::ClinicOwner,
            clinic_id: None,
            registration_date: Utc::now(),
        }
    }

    #[test]
    fn test_owner_with_password_conversion() {
        let stored = stored_owner();
        let owner: Owner = stored.clone().into();

        assert_eq!(owner.id, stored.id);
        assert_eq!(owner.role, Role::ClinicOwner);

        let json = serde_json::to_value(&owner).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["clinicId"], serde_json::Value::Null);
        assert_eq!(json["role"], "ClinicOwner");
    }

    #[test]
    fn test_owner_details_flatten() {
        let details = OwnerDetails {
            owner: stored_owner().into(),
            clinic_details: None,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["name"], "Saqlain");
        assert!(json["clinicDetails"].is_null());
    }
}
