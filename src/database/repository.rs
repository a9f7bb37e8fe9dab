//! Storage Ports
//!
//! Async repository traits implemented by the PostgreSQL adapter and the
//! in-memory adapter.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Clinic, ClinicDetails, Doctor, DoctorDetails, DoctorWithPassword, Owner, OwnerDetails,
    OwnerWithPassword, SearchFilter, User, UserWithPassword,
};

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No row matched. Reported to clients as 404, never as a server error.
    #[error("Record not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A stored value could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::ColumnDecode { index, source } => {
                RepositoryError::Corrupt(format!("column {}: {}", index, source))
            }
            other => RepositoryError::Database(other),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence for owners, clinics and doctors
#[async_trait]
pub trait ClinicRepository: Send + Sync {
    async fn insert_owner(&self, owner: &OwnerWithPassword) -> RepositoryResult<()>;

    /// `NotFound` when no owner has this id
    async fn find_owner_by_id(&self, id: Uuid) -> RepositoryResult<Owner>;

    /// Owners sharing the email OR the mobile number
    async fn find_owners_by_email_or_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<Owner>>;

    /// Earliest registered owner with this email, `NotFound` otherwise
    async fn find_owner_by_email(&self, email: &str) -> RepositoryResult<OwnerWithPassword>;

    /// Owners matching the filter, each joined with its clinic when linked
    async fn find_owners(&self, filter: &SearchFilter) -> RepositoryResult<Vec<OwnerDetails>>;

    /// Inserts the clinic and links it to `clinic.owner_id` atomically.
    ///
    /// Fails with `NotFound` when the owner is absent and `Conflict` when the
    /// owner already has a clinic. Either both writes commit or neither does.
    async fn register_clinic(&self, clinic: &Clinic) -> RepositoryResult<()>;

    /// Clinics matching the filter, joined with owner and doctor summaries
    async fn search_clinics(&self, filter: &SearchFilter) -> RepositoryResult<Vec<ClinicDetails>>;

    /// Inserts the doctor together with its affiliations
    async fn insert_doctor(&self, doctor: &DoctorWithPassword) -> RepositoryResult<()>;

    /// Doctors sharing the email OR the mobile number
    async fn find_doctors_by_email_or_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<Doctor>>;

    async fn find_doctor_by_email(&self, email: &str) -> RepositoryResult<DoctorWithPassword>;

    /// Doctors matching the filter, one clinic summary per affiliation.
    /// Affiliations without a clinic reference are omitted.
    async fn search_doctors(&self, filter: &SearchFilter) -> RepositoryResult<Vec<DoctorDetails>>;

    async fn health_check(&self) -> RepositoryResult<()>;
}

/// Persistence for patient-facing user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: &UserWithPassword) -> RepositoryResult<()>;

    /// Users sharing both the email AND the mobile number
    async fn find_users_by_email_and_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<User>>;

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<UserWithPassword>;

    async fn find_user_by_id(&self, id: Uuid) -> RepositoryResult<User>;
}
