//! HTTP Request Handlers
//!
//! Axum handlers for owner, clinic and doctor endpoints. Every handler runs
//! its service call under the configured request deadline.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    api::{extractors::ApiJson, middleware::AuthUser},
    database::{ClinicRepository, UserRepository},
    models::{requests::*, ClinicDetails, DoctorDetails, OwnerDetails},
    service::{CredentialService, RegistryService, UserService},
    utils::error::{AppError, AppResult},
    VERSION,
};

/// Literal prefix of the token returned by login endpoints
pub const TOKEN_PREFIX: &str = "BEARER ";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RegistryService>,
    pub users: Arc<UserService>,
    pub credentials: Arc<CredentialService>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Wire both services to a single repository
    pub fn new<R>(
        repository: Arc<R>,
        credentials: Arc<CredentialService>,
        request_timeout: Duration,
    ) -> Self
    where
        R: ClinicRepository + UserRepository + 'static,
    {
        Self {
            registry: Arc::new(RegistryService::new(repository.clone(), credentials.clone())),
            users: Arc::new(UserService::new(repository, credentials.clone())),
            credentials,
            request_timeout,
        }
    }
}

/// Success envelope: `{message, statusCode, data}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse<T> {
    pub message: String,
    pub status_code: u16,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(status: StatusCode, message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            status_code: status.as_u16(),
            data,
        }
    }
}

/// Handler result carrying the status code alongside the envelope
pub type ApiResponse<T> = AppResult<(StatusCode, Json<SuccessResponse<T>>)>;

pub(crate) fn respond<T>(status: StatusCode, message: &str, data: T) -> ApiResponse<T> {
    Ok((status, Json(SuccessResponse::new(status, message, data))))
}

/// Run a service call under the request deadline.
///
/// On expiry the call is dropped, which rolls back any open transaction.
pub async fn with_deadline<F, T, E>(timeout: Duration, operation: F) -> AppResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<AppError>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            log::warn!("Request exceeded its {:?} deadline", timeout);
            Err(AppError::Timeout(timeout.as_millis() as u64))
        }
    }
}

/// POST /v1/owner/register
pub async fn register_owner(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterOwnerRequest>,
) -> ApiResponse<()> {
    with_deadline(state.request_timeout, state.registry.register_owner(request)).await?;
    respond(StatusCode::CREATED, "Owner Registered Successfully", ())
}

/// POST /v1/clinic/register
pub async fn register_clinic(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    ApiJson(request): ApiJson<ClinicRegistrationRequest>,
) -> ApiResponse<ClinicRegistrationResponse> {
    let clinic_id = with_deadline(
        state.request_timeout,
        state
            .registry
            .register_clinic(&caller, &request.owner_id, request.clinic_details),
    )
    .await?;

    respond(
        StatusCode::CREATED,
        "Clinic Registered Successfully",
        ClinicRegistrationResponse { clinic_id },
    )
}

/// GET /v1/clinic/details
pub async fn search_clinics(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResponse<Vec<ClinicDetails>> {
    let clinics =
        with_deadline(state.request_timeout, state.registry.search_clinics(&params)).await?;
    respond(StatusCode::OK, "Fetched Successfully", clinics)
}

/// GET /v1/owner/details
pub async fn search_owners(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResponse<Vec<OwnerDetails>> {
    let owners = with_deadline(
        state.request_timeout,
        state.registry.search_owners(&caller, &params),
    )
    .await?;
    respond(StatusCode::OK, "Fetched Successfully", owners)
}

/// POST /v1/doctor/register
pub async fn register_doctor(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterDoctorRequest>,
) -> ApiResponse<()> {
    with_deadline(state.request_timeout, state.registry.register_doctor(request)).await?;
    respond(StatusCode::CREATED, "Doctor Registered Successfully", ())
}

/// GET /v1/doctor/details
pub async fn search_doctors(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResponse<Vec<DoctorDetails>> {
    let doctors =
        with_deadline(state.request_timeout, state.registry.search_doctors(&params)).await?;
    respond(StatusCode::OK, "Successfully Fetched Details", doctors)
}

/// POST /v1/owner/login
pub async fn login_owner(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResponse<String> {
    let token = with_deadline(state.request_timeout, state.registry.login_owner(request)).await?;
    respond(StatusCode::OK, "Login Successful", format!("{}{}", TOKEN_PREFIX, token))
}

/// POST /v1/doctor/login
pub async fn login_doctor(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResponse<String> {
    let token = with_deadline(state.request_timeout, state.registry.login_doctor(request)).await?;
    respond(StatusCode::OK, "Login Successful", format!("{}{}", TOKEN_PREFIX, token))
}

/// GET /v1/healthcheck
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthCheckResponse> {
    with_deadline(state.request_timeout, state.registry.health_check()).await?;

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
    };

    respond(StatusCode::OK, "Service Healthy", response)
}
