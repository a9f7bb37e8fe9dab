//! Data Models Module
//!
//! Entities (owners, clinics, doctors, users), authentication types, search
//! filters and request/response payloads.

pub mod auth;
pub mod clinic;
pub mod doctor;
pub mod filter;
pub mod owner;
pub mod requests;
pub mod user;

// Re-export commonly used types
pub use auth::{AccessTokenClaims, AuthContext, Role};
pub use clinic::{Clinic, ClinicDetails, ClinicSummary, SeasonTiming};
pub use doctor::{Affiliation, AffiliationDetails, Doctor, DoctorDetails, DoctorSummary, DoctorWithPassword};
pub use filter::{FilterError, SearchFilter};
pub use owner::{Owner, OwnerDetails, OwnerSummary, OwnerWithPassword};
pub use requests::*;
pub use user::{User, UserWithPassword};
