//! Clinic Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::DoctorSummary;
use super::owner::OwnerSummary;

/// Named opening window of a clinic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonTiming {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: Uuid,

    /// Owner that registered the clinic. Set once, at creation.
    pub owner_id: Uuid,

    pub name: String,
    pub address: String,
    pub mobile: i64,
    pub pincode: i32,

    #[sqlx(json)]
    pub season_timings: Vec<SeasonTiming>,

    /// Affiliated doctor ids
    #[sqlx(rename = "doctor_ids")]
    pub doctors: Vec<Uuid>,

    /// Always empty at creation
    pub wallet_id: Option<Uuid>,

    pub registration_date: DateTime<Utc>,
}

/// Clinic fields embedded in owner and doctor search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub mobile: i64,
    pub pincode: i32,
}

impl From<&Clinic> for ClinicSummary {
    fn from(clinic: &Clinic) -> Self {
        Self {
            id: clinic.id,
            name: clinic.name.clone(),
            address: clinic.address.clone(),
            mobile: clinic.mobile,
            pincode: clinic.pincode,
        }
    }
}

/// Clinic search result with its owner and doctors joined in.
///
/// A missing owner yields `null` and missing doctors an empty list; neither
/// suppresses the clinic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicDetails {
    #[serde(flatten)]
    pub clinic: Clinic,
    pub owner_details: Option<OwnerSummary>,
    pub doctor_details: Vec<DoctorSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clinic_serializes_camel_case() {
        let clinic = Clinic {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "HealthFirst".to_string(),
            address: "Residency Road".to_string(),
            mobile: 9876543000,
            pincode: 190011,
            season_timings: vec![SeasonTiming {
                name: "Summer".to_string(),
                start: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap(),
            }],
            doctors: Vec::new(),
            wallet_id: None,
            registration_date: Utc::now(),
        };

        let json = serde_json::to_value(ClinicDetails {
            clinic,
            owner_details: None,
            doctor_details: Vec::new(),
        })
        .unwrap();

        assert_eq!(json["seasonTimings"][0]["name"], "Summer");
        assert!(json["walletId"].is_null());
        assert!(json["ownerDetails"].is_null());
        assert_eq!(json["doctorDetails"], serde_json::json!([]));
    }
}
