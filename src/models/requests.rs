//! Request and Response Models
//!
//! API payloads with field validation. Missing fields deserialize to empty
//! values so that they are reported by the validators rather than rejected as
//! malformed JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::error::FieldErrors;
use crate::utils::validation::{
    address_validator, age_validator, clinic_name_validator, collect_field_errors,
    email_validator, gender_validator, messages, mobile_validator, name_validator,
    password_validator, pincode_validator, qualifications_validator, working_at_validator,
    MAX_SEASON_NAME_LENGTH,
};

/// Payloads that report validation failures as a field-keyed map.
///
/// An empty map means the payload is valid.
pub trait FieldValidate {
    fn field_errors(&self) -> FieldErrors;
}

macro_rules! field_validate_via_derive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValidate for $ty {
                fn field_errors(&self) -> FieldErrors {
                    collect_field_errors(self.validate())
                }
            }
        )*
    };
}

/// Request payload for registering a clinic owner
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterOwnerRequest {
    #[validate(custom(function = "name_validator"))]
    pub name: String,

    #[validate(custom(function = "email_validator"))]
    pub email: String,

    #[validate(custom(function = "password_validator"))]
    pub password: String,

    #[validate(custom(function = "address_validator"))]
    pub address: String,

    #[validate(custom(function = "gender_validator"))]
    pub gender: String,

    #[validate(custom(function = "mobile_validator"))]
    pub mobile: i64,
}

/// Season window as submitted; start and end are checked for presence
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeasonTimingRequest {
    pub name: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Clinic details nested in a clinic registration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicDetailsRequest {
    #[validate(custom(function = "clinic_name_validator"))]
    pub name: String,

    #[validate(custom(function = "address_validator"))]
    pub address: String,

    #[validate(custom(function = "mobile_validator"))]
    pub mobile: i64,

    #[validate(custom(function = "pincode_validator"))]
    pub pincode: i32,

    pub season_timings: Vec<SeasonTimingRequest>,
}

impl ClinicDetailsRequest {
    fn season_errors(&self, fields: &mut FieldErrors) {
        if self.season_timings.is_empty() {
            fields.insert("seasonTimings".into(), messages::SEASONS_MISSING.into());
            return;
        }

        for (i, season) in self.season_timings.iter().enumerate() {
            let key = |name: &str| format!("seasonTimings[{}].{}", i, name);

            let name = season.name.trim();
            if name.is_empty() {
                fields.insert(key("name"), messages::SEASON_NAME_MISSING.into());
            } else if name.chars().count() > MAX_SEASON_NAME_LENGTH {
                fields.insert(key("name"), messages::SEASON_NAME_TOO_LONG.into());
            }

            match (season.start, season.end) {
                (Some(start), Some(end)) if end <= start => {
                    fields.insert(key("range"), messages::SEASON_RANGE.into());
                }
                (start, end) => {
                    if start.is_none() {
                        fields.insert(key("start"), messages::SEASON_START_MISSING.into());
                    }
                    if end.is_none() {
                        fields.insert(key("end"), messages::SEASON_END_MISSING.into());
                    }
                }
            }
        }
    }
}

impl FieldValidate for ClinicDetailsRequest {
    fn field_errors(&self) -> FieldErrors {
        let mut fields = collect_field_errors(self.validate());
        self.season_errors(&mut fields);
        fields
    }
}

/// Request payload for registering a clinic under an owner
///
/// Only the nested clinic details are validated here; the owner id is
/// checked for format and existence by the registry service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicRegistrationRequest {
    pub owner_id: String,
    pub clinic_details: ClinicDetailsRequest,
}

impl FieldValidate for ClinicRegistrationRequest {
    fn field_errors(&self) -> FieldErrors {
        self.clinic_details.field_errors()
    }
}

/// Request payload for registering a doctor
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterDoctorRequest {
    #[validate(custom(function = "name_validator"))]
    pub name: String,

    #[validate(custom(function = "qualifications_validator"))]
    pub qualifications: String,

    #[validate(custom(function = "address_validator"))]
    pub address: String,

    #[validate(custom(function = "email_validator"))]
    pub email: String,

    #[validate(custom(function = "password_validator"))]
    pub password: String,

    #[validate(custom(function = "working_at_validator"))]
    pub working_at: String,

    #[validate(custom(function = "mobile_validator"))]
    pub mobile: i64,
}

/// Request payload for registering a patient-facing user
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterUserRequest {
    #[validate(custom(function = "name_validator"))]
    pub name: String,

    #[validate(custom(function = "email_validator"))]
    pub email: String,

    #[validate(custom(function = "password_validator"))]
    pub password: String,

    #[validate(custom(function = "address_validator"))]
    pub address: String,

    #[validate(custom(function = "age_validator"))]
    pub age: i32,

    #[validate(custom(function = "mobile_validator"))]
    pub mobile: i64,

    #[validate(custom(function = "pincode_validator"))]
    pub pincode: i32,
}

/// Credentials for owner, doctor and user login
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    #[validate(custom(function = "password_validator"))]
    pub password: String,
}

field_validate_via_derive!(
    RegisterOwnerRequest,
    RegisterDoctorRequest,
    RegisterUserRequest,
    LoginRequest,
);

/// Response for clinic registration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicRegistrationResponse {
    pub clinic_id: Uuid,
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}
