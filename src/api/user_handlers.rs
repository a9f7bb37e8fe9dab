//! User Account Handlers
//!
//! HTTP handlers for patient-facing user registration, login and profile
//! lookup.

use axum::{extract::State, http::StatusCode, Extension};

use crate::{
    api::{
        extractors::ApiJson,
        handlers::{respond, with_deadline, ApiResponse, AppState, TOKEN_PREFIX},
        middleware::AuthUser,
    },
    models::{requests::*, User},
};

/// POST /v1/user/register
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterUserRequest>,
) -> ApiResponse<()> {
    with_deadline(state.request_timeout, state.users.register_user(request)).await?;
    respond(StatusCode::CREATED, "User Registered Successfully", ())
}

/// POST /v1/user/login
pub async fn login_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResponse<String> {
    let token = with_deadline(state.request_timeout, state.users.login_user(request)).await?;
    respond(StatusCode::OK, "Login Successful", format!("{}{}", TOKEN_PREFIX, token))
}

/// GET /v1/user/details
///
/// Always the caller's own profile; the token subject selects the user.
pub async fn user_details(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
) -> ApiResponse<User> {
    let user = with_deadline(state.request_timeout, state.users.user_details(&caller)).await?;
    respond(StatusCode::OK, "Fetched Successfully", user)
}
