//! Registry Service
//!
//! Registration, search and login flows for clinic owners, clinics and
//! doctors. Every registration runs validate, then duplicate check, then
//! persist; nothing is retried.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::database::{ClinicRepository, RepositoryError};
use crate::models::filter::{CLINIC_FILTER_FIELDS, DOCTOR_FILTER_FIELDS, OWNER_FILTER_FIELDS};
use crate::models::{
    AuthContext, Clinic, ClinicDetails, ClinicDetailsRequest, DoctorDetails, DoctorWithPassword,
    FieldValidate, FilterError, LoginRequest, OwnerDetails, OwnerWithPassword,
    RegisterDoctorRequest, RegisterOwnerRequest, Role, SearchFilter, SeasonTiming,
};
use crate::service::credentials::{CredentialError, CredentialService};
use crate::utils::error::{AppError, FieldErrors};
use crate::utils::validation::normalize_email;

/// Reason reported for both unknown emails and wrong passwords
pub const INVALID_LOGIN_REASON: &str = "Invalid Email or Password";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Owner already exists")]
    OwnerAlreadyExists,

    #[error("Doctor already exists")]
    DoctorAlreadyExists,

    #[error("Owner already has a registered clinic")]
    ClinicAlreadyLinked,

    #[error("Invalid owner id '{0}'")]
    InvalidOwnerId(String),

    #[error("Owner not found")]
    OwnerNotFound,

    /// Caller tried to act on another owner's behalf
    #[error("Caller does not own this account")]
    NotAccountOwner,

    /// Token subject is not a valid account id
    #[error("Invalid account id in token")]
    InvalidSubject,

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    /// Login with an email no account is registered under
    #[error("{0} not found")]
    AccountNotFound(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(fields) => AppError::validation(fields),
            RegistryError::OwnerAlreadyExists => {
                AppError::Conflict("Duplicate Email or PhoneNumber".to_string())
            }
            RegistryError::DoctorAlreadyExists => {
                AppError::Conflict("Duplicate Email or Mobile".to_string())
            }
            RegistryError::ClinicAlreadyLinked => {
                AppError::Conflict("Owner already has a registered clinic".to_string())
            }
            RegistryError::InvalidOwnerId(id) => {
                log::warn!("Rejected malformed owner id '{}'", id);
                AppError::bad_request("Invalid Owner ID")
            }
            RegistryError::OwnerNotFound => {
                AppError::not_found("Owner Not Found", "No owner registered with this id")
            }
            RegistryError::NotAccountOwner => {
                AppError::Forbidden("Clinic can only be registered by its owner".to_string())
            }
            RegistryError::InvalidSubject => AppError::bad_request("Invalid account id in token"),
            RegistryError::InvalidFilter(e) => AppError::bad_request(e.to_string()),
            RegistryError::AccountNotFound(account) => {
                AppError::not_found(format!("{} Not Found", account), INVALID_LOGIN_REASON)
            }
            RegistryError::InvalidCredentials => {
                AppError::Authentication(INVALID_LOGIN_REASON.to_string())
            }
            RegistryError::Repository(e) => repository_error(e),
            RegistryError::Credential(e) => e.into(),
        }
    }
}

/// Storage failures reach clients as a fixed triple, never raw
pub(crate) fn repository_error(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::not_found("Not Found", "No matching record"),
        RepositoryError::Conflict(reason) => AppError::Conflict(reason),
        other => AppError::Internal(other.to_string()),
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

fn ensure_valid(fields: FieldErrors) -> RegistryResult<()> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(RegistryError::Validation(fields))
    }
}

/// Owner and doctor logins apply no field rules; blank credentials are a
/// plain credential mismatch.
fn ensure_credentials_present(request: &LoginRequest) -> RegistryResult<()> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(RegistryError::InvalidCredentials);
    }
    Ok(())
}

/// Owner, clinic and doctor orchestration over a [`ClinicRepository`]
#[derive(Clone)]
pub struct RegistryService {
    repository: Arc<dyn ClinicRepository>,
    credentials: Arc<CredentialService>,
}

impl RegistryService {
    pub fn new(repository: Arc<dyn ClinicRepository>, credentials: Arc<CredentialService>) -> Self {
        Self {
            repository,
            credentials,
        }
    }

    /// Register a clinic owner. Returns the new owner id.
    pub async fn register_owner(&self, request: RegisterOwnerRequest) -> RegistryResult<Uuid> {
        ensure_valid(request.field_errors())?;

        let email = normalize_email(&request.email);
        let existing = self
            .repository
            .find_owners_by_email_or_mobile(&email, request.mobile)
            .await?;
        if !existing.is_empty() {
            log::warn!("Rejected duplicate owner registration for {}", email);
            return Err(RegistryError::OwnerAlreadyExists);
        }

        let password_hash = self.credentials.hash_password(&request.password).await?;

        let owner = OwnerWithPassword {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email,
            password_hash,
            address: request.address.trim().to_string(),
            gender: request.gender.trim().to_string(),
            mobile: request.mobile,
            role: Role::ClinicOwner,
            clinic_id: None,
            registration_date: Utc::now(),
        };
        self.repository.insert_owner(&owner).await?;

        log::info!("Registered clinic owner {}", owner.id);
        Ok(owner.id)
    }

    /// Register a clinic under `owner_id` and link the owner to it.
    /// Returns the new clinic id.
    pub async fn register_clinic(
        &self,
        caller: &AuthContext,
        owner_id: &str,
        details: ClinicDetailsRequest,
    ) -> RegistryResult<Uuid> {
        let owner_id = Uuid::parse_str(owner_id.trim())
            .map_err(|_| RegistryError::InvalidOwnerId(owner_id.to_string()))?;

        if caller.subject_id() != Some(owner_id) {
            log::warn!(
                "Account {} attempted to register a clinic for owner {}",
                caller.subject,
                owner_id
            );
            return Err(RegistryError::NotAccountOwner);
        }

        let owner = self
            .repository
            .find_owner_by_id(owner_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => RegistryError::OwnerNotFound,
                other => other.into(),
            })?;

        ensure_valid(details.field_errors())?;

        if owner.clinic_id.is_some() {
            return Err(RegistryError::ClinicAlreadyLinked);
        }

        let season_timings = details
            .season_timings
            .into_iter()
            .filter_map(|season| {
                Some(SeasonTiming {
                    name: season.name.trim().to_string(),
                    start: season.start?,
                    end: season.end?,
                })
            })
            .collect();

        let clinic = Clinic {
            id: Uuid::new_v4(),
            owner_id,
            name: details.name.trim().to_string(),
            address: details.address.trim().to_string(),
            mobile: details.mobile,
            pincode: details.pincode,
            season_timings,
            doctors: Vec::new(),
            wallet_id: None,
            registration_date: Utc::now(),
        };

        self.repository
            .register_clinic(&clinic)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => RegistryError::OwnerNotFound,
                RepositoryError::Conflict(_) => RegistryError::ClinicAlreadyLinked,
                other => other.into(),
            })?;

        log::info!("Registered clinic {} for owner {}", clinic.id, owner_id);
        Ok(clinic.id)
    }

    /// Register a doctor with no affiliations or appointments.
    /// Returns the new doctor id.
    pub async fn register_doctor(&self, request: RegisterDoctorRequest) -> RegistryResult<Uuid> {
        ensure_valid(request.field_errors())?;

        let email = normalize_email(&request.email);
        let existing = self
            .repository
            .find_doctors_by_email_or_mobile(&email, request.mobile)
            .await?;
        if !existing.is_empty() {
            log::warn!("Rejected duplicate doctor registration for {}", email);
            return Err(RegistryError::DoctorAlreadyExists);
        }

        let password_hash = self.credentials.hash_password(&request.password).await?;

        let doctor = DoctorWithPassword {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            qualifications: request.qualifications.trim().to_string(),
            address: request.address.trim().to_string(),
            email,
            password_hash,
            working_at: request.working_at.trim().to_string(),
            mobile: request.mobile,
            role: Role::Doctor,
            appointments: Vec::new(),
            clinics: Vec::new(),
            registration_date: Utc::now(),
        };
        self.repository.insert_doctor(&doctor).await?;

        log::info!("Registered doctor {}", doctor.id);
        Ok(doctor.id)
    }

    pub async fn search_clinics(
        &self,
        params: &BTreeMap<String, String>,
    ) -> RegistryResult<Vec<ClinicDetails>> {
        let filter = SearchFilter::from_params(CLINIC_FILTER_FIELDS, params)?;
        Ok(self.repository.search_clinics(&filter).await?)
    }

    pub async fn search_doctors(
        &self,
        params: &BTreeMap<String, String>,
    ) -> RegistryResult<Vec<DoctorDetails>> {
        let filter = SearchFilter::from_params(DOCTOR_FILTER_FIELDS, params)?;
        Ok(self.repository.search_doctors(&filter).await?)
    }

    /// Admins search with their own filters; everyone else sees only
    /// their own owner record.
    pub async fn search_owners(
        &self,
        caller: &AuthContext,
        params: &BTreeMap<String, String>,
    ) -> RegistryResult<Vec<OwnerDetails>> {
        let filter = match caller.role {
            Role::Admin => SearchFilter::from_params(OWNER_FILTER_FIELDS, params)?,
            _ => SearchFilter::by_id(caller.subject_id().ok_or(RegistryError::InvalidSubject)?),
        };

        Ok(self.repository.find_owners(&filter).await?)
    }

    /// Returns a signed access token
    pub async fn login_owner(&self, request: LoginRequest) -> RegistryResult<String> {
        ensure_credentials_present(&request)?;

        let email = normalize_email(&request.email);
        let owner = self
            .repository
            .find_owner_by_email(&email)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => RegistryError::AccountNotFound("Owner"),
                other => other.into(),
            })?;

        self.check_password(&request.password, &owner.password_hash, &email)
            .await?;

        let token = self.credentials.issue_token(owner.id, owner.role)?;
        log::info!("Owner {} logged in", owner.id);
        Ok(token)
    }

    /// Returns a signed access token
    pub async fn login_doctor(&self, request: LoginRequest) -> RegistryResult<String> {
        ensure_credentials_present(&request)?;

        let email = normalize_email(&request.email);
        let doctor = self
            .repository
            .find_doctor_by_email(&email)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => RegistryError::AccountNotFound("Doctor"),
                other => other.into(),
            })?;

        self.check_password(&request.password, &doctor.password_hash, &email)
            .await?;

        let token = self.credentials.issue_token(doctor.id, doctor.role)?;
        log::info!("Doctor {} logged in", doctor.id);
        Ok(token)
    }

    pub async fn health_check(&self) -> RegistryResult<()> {
        Ok(self.repository.health_check().await?)
    }

    /// A verification error counts as a mismatch
    async fn check_password(&self, password: &str, hash: &str, email: &str) -> RegistryResult<()> {
        match self.credentials.verify_password(password, hash).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                log::warn!("Rejected login for {}: wrong password", email);
                Err(RegistryError::InvalidCredentials)
            }
            Err(e) => {
                log::warn!("Rejected login for {}: {}", email, e);
                Err(RegistryError::InvalidCredentials)
            }
        }
    }
}
