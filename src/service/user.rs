//! User Service Implementation
//!
//! Registration, login and profile lookup for patient-facing accounts.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::database::{RepositoryError, UserRepository};
use crate::models::{
    AuthContext, FieldValidate, LoginRequest, RegisterUserRequest, Role, User, UserWithPassword,
};
use crate::service::credentials::{CredentialError, CredentialService};
use crate::service::registry::{repository_error, INVALID_LOGIN_REASON};
use crate::utils::error::{AppError, FieldErrors};
use crate::utils::validation::normalize_email;

/// Custom error types for the user service
#[derive(Error, Debug)]
pub enum UserServiceError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Same email and mobile already registered
    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    /// Login with an email no user is registered under
    #[error("No user registered with this email")]
    UnknownEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid account id in token")]
    InvalidSubject,

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Validation(fields) => AppError::validation(fields),
            UserServiceError::UserAlreadyExists => {
                AppError::Conflict("Duplicate Email and Mobile".to_string())
            }
            UserServiceError::UserNotFound => AppError::not_found("User Not Found", "No User Found"),
            UserServiceError::UnknownEmail => {
                AppError::not_found("User Not Found", INVALID_LOGIN_REASON)
            }
            UserServiceError::InvalidCredentials => {
                AppError::Authentication(INVALID_LOGIN_REASON.to_string())
            }
            UserServiceError::InvalidSubject => {
                AppError::bad_request("Invalid account id in token")
            }
            UserServiceError::Repository(e) => repository_error(e),
            UserServiceError::Credential(e) => e.into(),
        }
    }
}

/// Result type for user service operations
pub type UserServiceResult<T> = Result<T, UserServiceError>;

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    credentials: Arc<CredentialService>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, credentials: Arc<CredentialService>) -> Self {
        Self {
            repository,
            credentials,
        }
    }

    /// Register a user. A user is a duplicate only when both email and
    /// mobile match an existing account.
    pub async fn register_user(&self, request: RegisterUserRequest) -> UserServiceResult<Uuid> {
        let fields = request.field_errors();
        if !fields.is_empty() {
            return Err(UserServiceError::Validation(fields));
        }

        let email = normalize_email(&request.email);
        let existing = self
            .repository
            .find_users_by_email_and_mobile(&email, request.mobile)
            .await?;
        if !existing.is_empty() {
            log::warn!("Rejected duplicate user registration for {}", email);
            return Err(UserServiceError::UserAlreadyExists);
        }

        let password_hash = self.credentials.hash_password(&request.password).await?;

        let user = UserWithPassword {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email,
            password_hash,
            address: request.address.trim().to_string(),
            age: request.age,
            mobile: request.mobile,
            pincode: request.pincode,
            role: Role::User,
            appointment_ids: Vec::new(),
            registration_date: Utc::now(),
        };
        self.repository.insert_user(&user).await?;

        log::info!("Registered user {}", user.id);
        Ok(user.id)
    }

    /// Returns a signed access token
    pub async fn login_user(&self, request: LoginRequest) -> UserServiceResult<String> {
        let fields = request.field_errors();
        if !fields.is_empty() {
            return Err(UserServiceError::Validation(fields));
        }

        let email = normalize_email(&request.email);
        let user = self
            .repository
            .find_user_by_email(&email)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UserServiceError::UnknownEmail,
                other => other.into(),
            })?;

        match self
            .credentials
            .verify_password(&request.password, &user.password_hash)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                log::warn!("Rejected user login for {}: wrong password", email);
                return Err(UserServiceError::InvalidCredentials);
            }
            Err(e) => {
                log::warn!("Rejected user login for {}: {}", email, e);
                return Err(UserServiceError::InvalidCredentials);
            }
        }

        let token = self.credentials.issue_token(user.id, user.role)?;
        log::info!("User {} logged in", user.id);
        Ok(token)
    }

    /// The caller's own profile, without the password hash
    pub async fn user_details(&self, caller: &AuthContext) -> UserServiceResult<User> {
        let id = caller
            .subject_id()
            .ok_or(UserServiceError::InvalidSubject)?;

        self.repository
            .find_user_by_id(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UserServiceError::UserNotFound,
                other => other.into(),
            })
    }
}
