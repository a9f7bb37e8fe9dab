//! Doctor Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::Role;
use super::clinic::ClinicSummary;

/// A doctor's working arrangement at one clinic.
///
/// `clinic_id` may be empty for sparse rows; search results omit those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affiliation {
    pub clinic_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub working_days: Vec<String>,
}

/// Doctor profile without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub qualifications: String,
    pub address: String,
    pub email: String,
    pub working_at: String,
    pub mobile: i64,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(rename = "appointment_ids")]
    pub appointments: Vec<Uuid>,
    #[sqlx(skip)]
    pub clinics: Vec<Affiliation>,
    pub registration_date: DateTime<Utc>,
}

/// Stored doctor record including the password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DoctorWithPassword {
    pub id: Uuid,
    pub name: String,
    pub qualifications: String,
    pub address: String,
    pub email: String,
    pub password_hash: String,
    pub working_at: String,
    pub mobile: i64,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(rename = "appointment_ids")]
    pub appointments: Vec<Uuid>,
    #[sqlx(skip)]
    pub clinics: Vec<Affiliation>,
    pub registration_date: DateTime<Utc>,
}

impl From<DoctorWithPassword> for Doctor {
    fn from(doctor: DoctorWithPassword) -> Self {
        Doctor {
            id: doctor.id,
            name: doctor.name,
            qualifications: doctor.qualifications,
            address: doctor.address,
            email: doctor.email,
            working_at: doctor.working_at,
            mobile: doctor.mobile,
            role: doctor.role,
            appointments: doctor.appointments,
            clinics: doctor.clinics,
            registration_date: doctor.registration_date,
        }
    }
}

/// Doctor fields embedded in clinic search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub qualifications: String,
    pub working_at: String,
    pub mobile: i64,
}

impl From<&DoctorWithPassword> for DoctorSummary {
    fn from(doctor: &DoctorWithPassword) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name.clone(),
            qualifications: doctor.qualifications.clone(),
            working_at: doctor.working_at.clone(),
            mobile: doctor.mobile,
        }
    }
}

/// One affiliation in a doctor search result, flattened to a single clinic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliationDetails {
    pub clinic_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub working_days: Vec<String>,
    /// `None` when the referenced clinic no longer exists
    pub clinic: Option<ClinicSummary>,
}

/// Doctor search result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDetails {
    pub id: Uuid,
    pub name: String,
    pub qualifications: String,
    pub address: String,
    pub email: String,
    pub working_at: String,
    pub mobile: i64,
    pub role: Role,
    pub appointments: Vec<Uuid>,
    pub clinics: Vec<AffiliationDetails>,
    pub registration_date: DateTime<Utc>,
}

impl DoctorDetails {
    pub fn new(doctor: Doctor, clinics: Vec<AffiliationDetails>) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            qualifications: doctor.qualifications,
            address: doctor.address,
            email: doctor.email,
            working_at: doctor.working_at,
            mobile: doctor.mobile,
            role: doctor.role,
            appointments: doctor.appointments,
            clinics,
            registration_date: doctor.registration_date,
        }
    }
}
